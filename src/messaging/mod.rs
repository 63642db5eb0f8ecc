pub mod background;
pub mod channel;
pub mod content;
pub mod message;
