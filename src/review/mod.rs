pub mod console;
pub mod controller;
pub mod review_model;
