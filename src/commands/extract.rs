use crate::job::{self, JobConfig, JobOutcome};
use crate::pdf::count_pages;
use anyhow::Result;
use std::path::Path;

/// Run an extraction job and print its outcome as JSON. Returns whether it succeeded.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    spec: &str,
    workdir: Q,
    total_pages: Option<u32>,
    config: &JobConfig,
) -> Result<bool> {
    let total_pages = match total_pages {
        Some(n) => n,
        None => count_pages(&input)?,
    };

    let result = job::run(input.as_ref(), workdir.as_ref(), total_pages, spec, config);
    let outcome = JobOutcome::from(&result);

    match (&result, &outcome.log_path) {
        (Ok(report), _) => tracing::info!(archive = %report.archive.display(), "archive ready"),
        (Err(e), _) if e.is_validation() => tracing::info!(error = %e, "selections rejected"),
        (Err(_), Some(log)) => tracing::error!(log_path = %log.display(), "extraction failed"),
        (Err(e), None) => tracing::error!(error = %e, "extraction failed"),
    }

    println!("{}", serde_json::to_string(&outcome)?);
    Ok(outcome.success)
}
