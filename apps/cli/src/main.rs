use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use provisioner::{
    BuildOptions, ConsoleProgressReporter, DownloadConfig, IntoProgressCallback, PluginRegistry,
    Provisioner,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdsetup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build an SD card layout from a JSON manifest")]
struct Cli {
    /// First manifest id (directory below cfg/sd)
    nand: String,

    /// Second manifest id (file name without .json)
    nsw: String,

    /// Directory containing cfg/ and external scripts
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long)]
    timeout: Option<u64>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress build output
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("provisioner={level},sdsetup={level}", level = default_level).into()
            }),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut download = DownloadConfig::default();
    if let Some(secs) = cli.timeout {
        download = download.with_timeout(Duration::from_secs(secs));
    }

    let mut options = BuildOptions::default()
        .with_base_dir(&cli.base_dir)
        .with_download_config(download)
        .quiet(cli.quiet);
    if !cli.quiet {
        options = options.with_progress_callback(ConsoleProgressReporter::new().into_callback());
    }

    let mut provisioner = Provisioner::load(&options, &cli.nand, &cli.nsw)
        .await
        .with_context(|| format!("Failed to load manifest {}/{}", cli.nand, cli.nsw))?
        .with_registry(PluginRegistry::new());

    let summary = match provisioner.build().await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Build aborted: {}", e);
            return Err(e).context("Build aborted");
        }
    };

    info!("Build summary: {:?}", summary);
    if !cli.quiet {
        println!(
            "\n{} downloaded, {} installed, {} skipped, {} failed, {} ini file(s), {} plugin(s)",
            summary.downloaded,
            summary.installed,
            summary.skipped,
            summary.failed,
            summary.ini_written,
            summary.plugins_run
        );
        for message in &summary.errors {
            eprintln!("  {}", message);
        }
    }

    Ok(())
}
