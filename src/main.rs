use std::sync::Arc;
use std::process::ExitCode;
use anyhow::Result;
use clap::Parser;
use tracing::{info, error};

use cli_interface::{render_summary, write_report, Cli, ProgressReporter};
use model_fetcher::ModelFetcher;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Settings come first so logging can honour them
    let settings = cli.load_settings()?;
    logging::init_logging(&settings.logging)?;

    info!(
        "Fetching artifacts for {} into {}",
        settings.source.repo_url,
        settings.download.output_dir.display()
    );

    let mut fetcher = ModelFetcher::new(&settings)?.with_dry_run(cli.dry_run);
    if !cli.no_progress && !cli.dry_run {
        fetcher = fetcher.with_observer(Arc::new(ProgressReporter::new()));
    }

    let summary = match fetcher.run().await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Fetch aborted: {:#}", e);
            return Err(e);
        }
    };

    println!("{}", render_summary(&summary));

    if let Some(path) = &cli.report {
        write_report(path, &summary)?;
        info!("Report written to {}", path.display());
    }

    if cli.strict && summary.has_failures() {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
