//! Multi-platform packaging library for JVM applications
//!
//! This library assembles application jars, native libraries and a bundled
//! Java runtime into:
//! - Linux tarballs (install tree run by the system `java`)
//! - macOS `.app` bundles (tarball)
//! - Windows zips and Inno Setup installers
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
