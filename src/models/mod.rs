pub mod document;
pub mod loaders;
pub mod paragraph;
pub mod review;

pub use document::{Document, DocumentFormat};
pub use loaders::{extract_document, extract_paragraphs};
pub use paragraph::ParagraphSequence;
pub use review::{ModelParams, ReviewEntry, ReviewReport, ReviewResult, ReviewSettings};
