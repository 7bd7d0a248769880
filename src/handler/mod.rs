//! Request handler module
//!
//! Responsible for request routing dispatch and the movie CRUD handlers.

pub mod movies;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
