pub mod extractor;
pub mod label;
