//! Run summary output

use std::path::Path;
use anyhow::{Context, Result};
use console::style;

use common::models::{ArtifactOutcome, FetchSummary};
use common::utils::{format_bytes, format_duration, truncate_string};

/// Longest failure reason printed in the summary
const MAX_REASON_LENGTH: usize = 160;

/// Renders the end-of-run summary
pub fn render_summary(summary: &FetchSummary) -> String {
    let mut lines = Vec::new();

    lines.push(style("Fetch summary").bold().to_string());
    lines.push(format!("  Documents:   {}", summary.documents));
    lines.push(format!("  Downloaded:  {} ({})", summary.downloaded(), format_bytes(summary.total_bytes())));
    lines.push(format!("  Skipped:     {}", summary.skipped()));

    if summary.planned() > 0 {
        lines.push(format!("  Planned:     {}", summary.planned()));
    }

    let failed = summary.failed();
    let failed_count = if failed.is_empty() {
        style(failed.len()).green()
    } else {
        style(failed.len()).red()
    };
    lines.push(format!("  Failed:      {}", failed_count));

    if let Some(elapsed) = summary.elapsed() {
        lines.push(format!("  Elapsed:     {}", format_duration(elapsed)));
    }

    for outcome in failed {
        if let ArtifactOutcome::Failed { url, reason } = outcome {
            lines.push(format!(
                "  {} {}: {}",
                style("x").red(),
                url,
                truncate_string(reason, MAX_REASON_LENGTH)
            ));
        }
    }

    lines.join("\n")
}

/// Writes the summary as pretty-printed JSON
pub fn write_report(path: &Path, summary: &FetchSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize run report")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(path, json).with_context(|| format!("Failed to write report {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_summary() -> FetchSummary {
        let mut summary = FetchSummary::new();
        summary.documents = 2;
        summary.record(ArtifactOutcome::Downloaded {
            url: "https://x/a.bin".to_string(),
            path: PathBuf::from("out/sam/a.bin"),
            bytes: 2048,
        });
        summary.record(ArtifactOutcome::Skipped {
            url: "https://x/b.bin".to_string(),
            path: PathBuf::from("out/sam/b.bin"),
        });
        summary.record(ArtifactOutcome::Failed {
            url: "https://x/c.bin".to_string(),
            reason: "External service error: HTTP 500 Internal Server Error".to_string(),
        });
        summary.finish();
        summary
    }

    #[test]
    fn test_render_summary_lists_counts_and_failures() {
        let rendered = console::strip_ansi_codes(&render_summary(&sample_summary())).to_string();

        assert!(rendered.contains("Documents:   2"));
        assert!(rendered.contains("Downloaded:  1 (2.0 KiB)"));
        assert!(rendered.contains("Skipped:     1"));
        assert!(rendered.contains("Failed:      1"));
        assert!(rendered.contains("https://x/c.bin: External service error: HTTP 500"));
        assert!(!rendered.contains("Planned"));
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reports").join("run.json");

        write_report(&path, &sample_summary()).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["documents"], 2);
        assert_eq!(json["outcomes"][2]["status"], "failed");
    }
}
