use crate::job;
use anyhow::{Context, Result};
use std::path::Path;

/// Remove a job's working directory and, optionally, its uploaded source.
pub fn run(workdir: &Path, source: Option<&Path>) -> Result<()> {
    job::clean(workdir, source)
        .with_context(|| format!("Failed to clean up {}", workdir.display()))?;
    println!(r#"{{"success":true}}"#);
    Ok(())
}
