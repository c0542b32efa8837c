//! Trend Review - Main Entry Point

use clap::Parser;
use tracing::info;
use trendreview::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json)?;

    info!("=== Trend Review v{} ===", env!("CARGO_PKG_VERSION"));

    let summary = run(&cli)?;
    if summary.fault_count() == 0 {
        info!("No faults found in {}", cli.filepath.display());
    } else {
        info!(
            "{} of {} rules faulted, see {}",
            summary.fault_count(),
            summary.rules_evaluated,
            cli.report_path.display()
        );
    }

    Ok(())
}
