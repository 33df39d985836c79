use anyhow::{Context, Result};
use lopdf::Document;
use std::path::Path;

pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path)
            .with_context(|| format!("Failed to open PDF: {}", path.display()))?;
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }
}

/// Page count of the PDF at `path`, the bound every selection is checked against.
pub fn count_pages<P: AsRef<Path>>(path: P) -> Result<u32> {
    let doc = PdfDocument::open(&path)?;
    let pages = doc.page_count();
    if pages == 0 {
        anyhow::bail!("PDF has no pages: {}", path.as_ref().display());
    }
    Ok(pages)
}
