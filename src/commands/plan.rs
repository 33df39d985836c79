use crate::job::{self, JobConfig};
use crate::pdf::count_pages;
use anyhow::Result;
use std::path::{self, Path};

/// Print the script an extraction would run, without running it.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    spec: &str,
    workdir: Q,
    total_pages: Option<u32>,
    config: &JobConfig,
) -> Result<()> {
    let total_pages = match total_pages {
        Some(n) => n,
        None => count_pages(&input)?,
    };

    let source = path::absolute(&input)?;
    let workdir = path::absolute(&workdir)?;
    let script = job::plan(&source, &workdir, total_pages, spec, config)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    print!("{}", script.render());
    Ok(())
}
