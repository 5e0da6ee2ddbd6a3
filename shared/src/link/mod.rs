pub mod error;
pub mod link;
