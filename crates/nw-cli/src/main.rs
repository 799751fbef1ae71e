mod report;

use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use nw_config::WatchConfig;
use nw_core::store::Store;
use nw_runtime::lifecycle::Pipeline;
use nw_runtime::tracing_init::init_tracing;

#[derive(Parser)]
#[command(name = "nightwatch", about = "NightWatch streaming log anomaly detector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the detection pipeline over the configured input feed
    Run {
        /// Path to nightwatch.toml; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => run(config),
    }
}

fn run(config_path: Option<PathBuf>) -> Result<()> {
    let (config, base_dir) = match config_path {
        Some(path) => {
            let path = path
                .canonicalize()
                .map_err(|e| anyhow::anyhow!("config path '{}': {e}", path.display()))?;
            let base = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            (WatchConfig::load(&path)?, base)
        }
        None => (WatchConfig::default(), PathBuf::from(".")),
    };

    let _guard = init_tracing(&config.logging, &base_dir)?;

    report::print_banner();

    let critical_log = config.alert.critical_log.clone();
    let pipeline = Pipeline::start(config)?;
    let store = pipeline.store();

    supervise(&store);
    pipeline.wait()?;

    report::print_dashboard(&store.dashboard_snapshot());
    println!(
        "Clean exit. Critical alerts recorded in {}.",
        critical_log.display()
    );
    Ok(())
}

/// Report ingestion progress once per second until the feed is exhausted
/// and the window has drained.
fn supervise(store: &Store) {
    let mut last_total = 0;
    loop {
        let progress = store.progress();
        if progress.ingestion_done && progress.live_entries == 0 {
            break;
        }
        if progress.total_logs > last_total {
            print!("\rProcessing logs: {}", progress.total_logs);
            let _ = std::io::stdout().flush();
            last_total = progress.total_logs;
        }
        std::thread::sleep(Duration::from_secs(1));
    }
    if last_total > 0 {
        println!();
    }
}
