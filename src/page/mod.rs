pub mod control;
pub mod document;
pub mod page_model;
pub mod rewrite;
