pub mod document;

pub use document::count_pages;
