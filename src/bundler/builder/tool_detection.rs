//! External tool detection and availability checking.
//!
//! Lookups are cached so that concurrent target pipelines do not each probe
//! `PATH`. A missing tool makes the targets that need it skippable.

use std::{path::PathBuf, sync::LazyLock};

fn locate(candidates: &[&str], purpose: &str) -> Option<PathBuf> {
    for candidate in candidates {
        match which::which(candidate) {
            Ok(path) => {
                log::debug!("Found {} at: {}", candidate, path.display());
                return Some(path);
            }
            Err(e) => log::debug!("{} not found in PATH: {}", candidate, e),
        }
    }
    log::debug!("No {} available; targets needing it will be skipped", purpose);
    None
}

/// `java`, used to run `launch4j.jar`.
pub static JAVA: LazyLock<Option<PathBuf>> = LazyLock::new(|| locate(&["java"], "java runtime"));

/// Native `launch4j` launcher script.
pub static LAUNCH4J: LazyLock<Option<PathBuf>> =
    LazyLock::new(|| locate(&["launch4j"], "launch4j"));

/// Inno Setup command-line compiler.
pub static ISCC: LazyLock<Option<PathBuf>> =
    LazyLock::new(|| locate(&["iscc", "ISCC.exe", "ISCC"], "Inno Setup compiler"));

/// Wine, needed to run Windows-only tools elsewhere.
pub static WINE: LazyLock<Option<PathBuf>> =
    LazyLock::new(|| locate(&["wine", "wine64"], "wine"));

/// Whether Windows executables must go through wine on this host.
pub fn needs_wine() -> bool {
    !cfg!(windows)
}
