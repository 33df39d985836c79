use crate::pdf::count_pages;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct PageCount {
    pub pages: u32,
}

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let result = PageCount {
        pages: count_pages(&path)?,
    };
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
