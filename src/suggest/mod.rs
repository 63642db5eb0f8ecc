pub mod backend;
pub mod prompt;
pub mod requester;
pub mod response;
