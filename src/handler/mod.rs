//! Request handler module
//!
//! Request dispatch plus the static page serving it routes to.

pub mod pages;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
