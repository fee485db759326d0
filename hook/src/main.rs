/// Site Manager scaffold hook - Main Entry Point
///
/// Invoked from the project's dependency-manager scripts after an update
/// (`sm-scaffold hook post-update-cmd`) or directly (`sm-scaffold scaffold`)
/// to download the deployment scaffold files into the project root.
mod handler;
mod plugin;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sm_scaffold_downloader::HttpTransport;
use sm_scaffold_shared::errors::FetchFailure;
use sm_scaffold_shared::events::ScriptEvent;
use sm_scaffold_shared::host_config::{EnvOverrides, HostConfig};
use sm_scaffold_shared::models::FetchReport;
use tracing::info;

#[derive(Parser)]
#[command(name = "sm-scaffold", version, about = "Download the Site Manager deployment scaffold")]
struct Cli {
    /// Project directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    working_dir: Option<PathBuf>,

    /// Print the fetch report as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Handle a lifecycle event (only post-update-cmd triggers a download)
    Hook {
        /// Event name, e.g. post-update-cmd
        event: String,
    },
    /// Download the scaffold files now
    Scaffold,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let default_filter = format!(
        "sm_scaffold_hook={0},sm_scaffold_downloader={0},sm_scaffold_shared={0}",
        default_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &FetchReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize fetch report")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env so COMPOSER / COMPOSER_VENDOR_DIR / RUST_LOG can live there
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let working_dir = match cli.working_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let transport = HttpTransport::with_default_timeout()?;

    let result: Result<Option<FetchReport>, FetchFailure> = match cli.command {
        Command::Hook { event } => {
            let event: ScriptEvent = event.parse()?;
            plugin::on_event(event, &working_dir, &EnvOverrides::from_env(), transport).await
        }
        Command::Scaffold => {
            let host = HostConfig::load(&working_dir).context("Failed to resolve host configuration")?;
            info!("Project root: {}", host.project_root()?.display());
            plugin::scaffold(host, transport).await.map(Some)
        }
    };

    match result {
        Ok(Some(report)) => {
            if cli.json {
                print_report(&report)?;
            }
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(failure) => {
            if cli.json {
                print_report(&failure.report)?;
            }
            Err(failure.into())
        }
    }
}
