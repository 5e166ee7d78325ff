//! Shared helpers: file system, downloads, argument lists and deferred
//! values.

pub mod args;
pub mod deferred;
pub mod fs;
pub mod http;

pub use deferred::Deferred;
