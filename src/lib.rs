//! Form autofill: detect the fillable fields of a page, ask a model for
//! values that satisfy free-text requirements, let a human review them, and
//! write the approved values back into the page.

pub mod apply;
pub mod cli;
pub mod error;
pub mod fields;
pub mod messaging;
pub mod page;
pub mod review;
pub mod suggest;
