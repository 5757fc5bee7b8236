//! End-to-end runs of the scenario fixtures, through the library and the
//! `simple-gal-client` binary.

use simple_gal_client::activity::Activity;
use simple_gal_client::config::{self, BehaviorConfig};
use simple_gal_client::scenario::{ImageStatus, Report, Scenario, Simulation};
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

fn fixture(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(rel)
}

fn simulate(name: &str, config: &BehaviorConfig) -> Report {
    let scenario = Scenario::load(&fixture(&format!("scenarios/{name}.toml"))).unwrap();
    Simulation::new(&scenario, config).unwrap().run()
}

fn count(report: &Report, pred: impl Fn(&Activity) -> bool) -> usize {
    report.journal.iter().filter(|e| pred(&e.activity)).count()
}

fn statuses(report: &Report) -> Vec<ImageStatus> {
    report.images.iter().map(|i| i.status).collect()
}

#[test]
fn fallback_polling_loads_every_image_once() {
    let report = simulate("fallback", &BehaviorConfig::default());
    assert_eq!(report.strategy, "fallback");
    assert_eq!(statuses(&report), vec![ImageStatus::Loaded; 4]);

    // Burst at 0/50/100ms is one window; then one window per later scroll.
    // The scroll at 4000ms arrives after the listener is gone.
    assert_eq!(count(&report, |a| matches!(a, Activity::SweepScheduled)), 4);
    assert_eq!(count(&report, |a| matches!(a, Activity::SwapStarted { .. })), 4);
    assert_eq!(count(&report, |a| matches!(a, Activity::SwapCompleted { .. })), 4);
    assert_eq!(count(&report, |a| matches!(a, Activity::ScrollUnsubscribed)), 1);

    let first_swap = report
        .journal
        .iter()
        .find(|e| matches!(e.activity, Activity::SwapStarted { .. }))
        .unwrap();
    assert_eq!(first_swap.at, Duration::from_millis(200));
}

#[test]
fn observer_swaps_on_intersection() {
    let report = simulate("observer", &BehaviorConfig::default());
    assert_eq!(report.strategy, "observer");
    assert_eq!(
        statuses(&report),
        vec![ImageStatus::Loaded, ImageStatus::Failed, ImageStatus::Pending]
    );
    assert_eq!(count(&report, |a| matches!(a, Activity::SweepScheduled)), 0);
}

#[test]
fn observer_disabled_by_config() {
    let config = config::load_config(&fixture("config/polling.toml")).unwrap();
    assert_eq!(config.lazy.throttle, Duration::from_millis(50));
    let report = simulate("observer", &config);
    assert_eq!(report.strategy, "fallback");
    // Polling starts with the first scroll, at 500ms.
    let first_swap = report
        .journal
        .iter()
        .find(|e| matches!(e.activity, Activity::SwapStarted { .. }))
        .unwrap();
    assert_eq!(first_swap.at, Duration::from_millis(550));
}

#[test]
fn gallery_session_wraps_and_debounces() {
    let report = simulate("gallery", &BehaviorConfig::default());
    let gallery = report.gallery.as_ref().unwrap();
    assert_eq!(gallery.offset, 0.0);
    assert!(!gallery.modal_open);
    assert_eq!(gallery.index_text, "1 / 4");

    let moves: Vec<(f64, f64)> = report
        .journal
        .iter()
        .filter_map(|e| match e.activity {
            Activity::GalleryMoved { from, to } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        moves,
        vec![(0.0, 800.0), (800.0, 1600.0), (1600.0, 2400.0), (2400.0, 0.0)]
    );

    let updates: Vec<Duration> = report
        .journal
        .iter()
        .filter(|e| matches!(e.activity, Activity::IndexUpdated { .. }))
        .map(|e| e.at)
        .collect();
    assert_eq!(updates, vec![Duration::from_millis(550)]);
}

// =============================================================================
// Binary
// =============================================================================

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_simple-gal-client"))
}

#[test]
fn cli_simulate_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = bin()
        .arg("--config")
        .arg(tmp.path().join("client.toml"))
        .arg("simulate")
        .arg(fixture("scenarios/gallery.toml"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "simulate failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["strategy"], "observer");
    assert_eq!(json["gallery"]["index_text"], "1 / 4");
    assert_eq!(json["journal"][0]["kind"], "strategy-selected");
}

#[test]
fn cli_simulate_text() {
    let out = bin()
        .arg("--config")
        .arg(fixture("config/polling.toml"))
        .arg("simulate")
        .arg(fixture("scenarios/fallback.toml"))
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("Strategy: fallback"));
    assert!(stdout.contains("001 full/001-dawn.avif"));
    assert!(stdout.contains("scroll listener removed"));
}

#[test]
fn cli_gen_config_passes_check_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("client.toml");
    let out = bin().arg("gen-config").output().unwrap();
    assert!(out.status.success());
    std::fs::write(&path, &out.stdout).unwrap();

    let out = bin().arg("--config").arg(&path).arg("check-config").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Config is valid"));
}

#[test]
fn cli_rejects_invalid_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("client.toml");
    std::fs::write(&path, "[gallery]\ndebounce = \"0ms\"\n").unwrap();
    let out = bin().arg("--config").arg(&path).arg("check-config").output().unwrap();
    assert!(!out.status.success());
}
