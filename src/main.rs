use clap::{Parser, Subcommand};
use simple_gal_client::{config, output, scenario};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "simple-gal-client")]
#[command(about = "Lazy image loading and gallery behavior for simple-gal pages")]
#[command(long_about = "\
Lazy image loading and gallery behavior for simple-gal pages

Runs the page behavior (lazy image activation, image swaps, gallery
navigation) against an in-memory page described by a scenario file, and
reports what happened in virtual time.

Scenario structure:

  [viewport]                       # 800×600 by default
  intersection_observer = false    # force the scroll-polling fallback
  [loads]
  latency = \"100ms\"                # src set → load/error event
  [[images]]                       # one per lazy placeholder
  src = \"full/001-dawn.avif\"
  top = 1200
  [gallery]
  images = 4
  [[events]]                       # timeline, in virtual time
  at = \"250ms\"
  action = { kind = \"scroll\", y = 900 }

Actions: scroll, gallery-scroll, click (open/close/prev/next), key.

Run 'simple-gal-client gen-config' to generate a documented client.toml.")]
#[command(version)]
struct Cli {
    /// Behavior config file (stock defaults when missing)
    #[arg(long, default_value = "client.toml", global = true)]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a scenario file and print what the page did
    Simulate {
        /// Scenario TOML file
        scenario: PathBuf,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock client.toml with all options documented
    GenConfig,
    /// Validate the behavior config without running anything
    CheckConfig,
}

fn init_tracing(verbosity: u8) -> Result<(), Box<dyn std::error::Error>> {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("simple_gal_client={}", level).parse()?);
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Simulate { scenario, json } => {
            let behavior = config::load_config(&cli.config)?;
            let scenario = scenario::Scenario::load(&scenario)?;
            let report = scenario::Simulation::new(&scenario, &behavior)?.run();
            info!(entries = report.journal.len(), "simulation finished");
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_report(&report);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::CheckConfig => {
            println!("==> Checking {}", cli.config.display());
            let behavior = config::load_config(&cli.config)?;
            println!(
                "lazy: throttle {:?}, observer {:?}",
                behavior.lazy.throttle, behavior.lazy.observer
            );
            println!("gallery: debounce {:?}", behavior.gallery.debounce);
            println!("==> Config is valid");
        }
    }

    Ok(())
}
