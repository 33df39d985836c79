pub mod clean;
pub mod extract;
pub mod pages;
pub mod plan;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// Read a selection specification from a file, or from stdin when the path is `-`.
pub fn read_selections(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut spec = String::new();
        std::io::stdin()
            .read_to_string(&mut spec)
            .context("Failed to read selections from stdin")?;
        return Ok(spec);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read selections: {}", path.display()))
}
