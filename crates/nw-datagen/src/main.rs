use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use clap::{Parser, Subcommand};

use nw_datagen::scenario::{write_to, ScenarioConfig};

#[derive(Parser)]
#[command(name = "nw-datagen", about = "NightWatch test feed generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a scenario feed file
    Gen {
        /// Output file
        #[arg(long, default_value = "sample_logs.txt")]
        out: PathBuf,

        /// RNG seed for reproducible feeds
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Epoch second the final entry lands on (defaults to now)
        #[arg(long)]
        anchor: Option<i64>,

        /// Background traffic only, no attack patterns
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Gen {
            out,
            seed,
            anchor,
            quiet,
        } => {
            let config = if quiet {
                ScenarioConfig::quiet(seed, 600)
            } else {
                ScenarioConfig {
                    seed,
                    ..ScenarioConfig::default()
                }
            };
            let anchor = anchor.unwrap_or_else(epoch_now);

            let scenario = write_to(&out, &config, anchor)?;
            println!(
                "Generated {} log entries in {}",
                scenario.entries,
                out.display()
            );
            println!(
                "Time span: {} seconds (~{:.1} minutes)",
                scenario.span_secs,
                scenario.span_secs as f64 / 60.0
            );
        }
    }

    Ok(())
}

fn epoch_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
