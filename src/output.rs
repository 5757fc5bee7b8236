//! CLI output formatting for simulation reports.
//!
//! # Output Format
//!
//! ```text
//! Strategy: fallback
//!
//! Timeline
//!      0ms  strategy fallback (3 images)
//!      0ms  sweep scheduled
//!    200ms  swap started #2 → #9
//!    200ms  sweep: 1 swapped, 2 remaining
//!    300ms  swap completed #2 → #9
//!
//! Images
//! 001 1.avif
//!     Status: pending
//! 002 2.avif
//!     Status: loaded
//!
//! Gallery
//!     Offset: 800px
//!     Index: 2 / 4
//!     Modal: open
//! ```
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and [`print_report`] writes them to stdout.

use crate::activity::{Activity, Entry};
use crate::scenario::{ImageStatus, Report};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn describe(activity: &Activity) -> String {
    match activity {
        Activity::StrategySelected { strategy, tracked } => {
            format!("strategy {} ({} images)", strategy, tracked)
        }
        Activity::SweepScheduled => "sweep scheduled".to_string(),
        Activity::Sweep { swapped, remaining } => {
            format!("sweep: {} swapped, {} remaining", swapped, remaining)
        }
        Activity::SwapStarted {
            placeholder,
            replacement,
        } => format!("swap started {} → {}", placeholder, replacement),
        Activity::SwapCompleted {
            placeholder,
            replacement,
        } => format!("swap completed {} → {}", placeholder, replacement),
        Activity::SwapSkipped {
            placeholder,
            reason,
        } => format!("swap skipped {}: {}", placeholder, reason),
        Activity::ScrollUnsubscribed => "scroll listener removed".to_string(),
        Activity::ModalOpened => "modal opened".to_string(),
        Activity::ModalClosed => "modal closed".to_string(),
        Activity::GalleryMoved { from, to } => format!("gallery {}px → {}px", from, to),
        Activity::IndexUpdated { index, count } => format!("index {} / {}", index, count),
    }
}

pub fn format_timeline(entries: &[Entry]) -> Vec<String> {
    let mut lines = vec!["Timeline".to_string()];
    for entry in entries {
        lines.push(format!(
            "{}{:>5}ms  {}",
            indent(1),
            entry.at.as_millis(),
            describe(&entry.activity)
        ));
    }
    lines
}

fn status_label(status: ImageStatus) -> &'static str {
    match status {
        ImageStatus::Pending => "pending",
        ImageStatus::Loading => "loading",
        ImageStatus::Loaded => "loaded",
        ImageStatus::Failed => "failed (placeholder kept)",
        ImageStatus::Skipped => "skipped",
    }
}

pub fn format_report(report: &Report) -> Vec<String> {
    let mut lines = vec![format!("Strategy: {}", report.strategy), String::new()];
    lines.extend(format_timeline(&report.journal));

    if !report.images.is_empty() {
        lines.push(String::new());
        lines.push("Images".to_string());
        for (i, image) in report.images.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), image.src));
            lines.push(format!("{}Status: {}", indent(1), status_label(image.status)));
        }
    }

    if let Some(gallery) = &report.gallery {
        lines.push(String::new());
        lines.push("Gallery".to_string());
        lines.push(format!("{}Offset: {}px", indent(1), gallery.offset));
        if !gallery.index_text.is_empty() {
            lines.push(format!("{}Index: {}", indent(1), gallery.index_text));
        }
        let modal = if gallery.modal_open { "open" } else { "closed" };
        lines.push(format!("{}Modal: {}", indent(1), modal));
    }
    lines
}

pub fn print_report(report: &Report) {
    for line in format_report(report) {
        println!("{}", line);
    }
}
