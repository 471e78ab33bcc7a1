//! Kohksh CLI
//!
//! Runs the loading shell and the engine on the host, with the main thread
//! standing in for the Android UI thread.

mod config;
mod run;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::KohkshConfig;

/// Kohksh launcher shell and engine
#[derive(Parser, Debug)]
#[command(name = "kohksh")]
#[command(about = "Run the Kohksh loading shell and engine headless")]
#[command(version)]
struct Cli {
    /// Config file or directory containing kohksh.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the loading screen, then launch the engine
    Run {
        /// Override the loading delay
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Stop the engine after this many frames
        #[arg(long)]
        frames: Option<u64>,

        /// Print a JSON run report to stdout
        #[arg(long)]
        report_json: bool,
    },

    /// Print the string `getVersion` reports
    Version,

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            delay_ms,
            frames,
            report_json,
        } => {
            let mut config = KohkshConfig::resolve(cli.config.as_deref())?;
            if let Some(delay_ms) = delay_ms {
                config.shell.launch_delay_ms = delay_ms;
            }
            if frames.is_some() {
                config.engine.max_frames = frames;
            }
            config.validate().context("Invalid command line override")?;

            let report = run::run(config)?;
            if report_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            if !report.succeeded() {
                anyhow::bail!(
                    "launch {:?}: {}",
                    report.status,
                    report.message.as_deref().unwrap_or("no native call made")
                );
            }
        }
        Commands::Version => {
            println!("{}", kohksh_engine::version_string());
        }
        Commands::Config => {
            let config = KohkshConfig::resolve(cli.config.as_deref())?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
