//! Multi-platform packaging pipeline for JVM applications.
//!
//! Takes an application's jars, its native-library archives and a pinned
//! Java runtime, and assembles them into platform packages.
//!
//! # Configuration
//!
//! Packaging is configured through `bundle.toml` (see
//! [`metadata`](crate::metadata)) or directly with [`SettingsBuilder`].
//!
//! # Supported Formats
//!
//! | Target | Format | Runtime |
//! |--------|--------|---------|
//! | `linux32`, `linux64` | `.tar.gz` install tree | system `java` |
//! | `macos` | `.app` bundle in a `.tar.gz` | bundled |
//! | `windows32`, `windows64` | `.zip` with launch4j executables | bundled |
//! | `windows-installer` | Inno Setup `.exe` | both Windows runtimes |
//!
//! # Components
//!
//! - [`natives`]: native-library classification
//! - [`runtime`]: runtime fetching, caching and pruning
//! - [`plist`]: `Info.plist` and `PkgInfo` generation
//! - [`launcher`]: launch4j configuration and POSIX launcher scripts
//! - [`layout`] and [`platform`]: per-target layout composition
//! - [`archive`]: deterministic tar.gz and zip writers

pub mod archive;
mod builder;
pub mod error;
pub mod fileset;
pub mod launcher;
pub mod layout;
pub mod natives;
pub mod platform;
pub mod plist;
pub mod runtime;
pub mod settings;
pub mod utils;

// Public re-exports
pub use builder::{BundleReport, BundledArtifact, Bundler, TargetOutcome};
pub use error::{Context, Error, ErrorExt, Result};
pub use platform::{Archiver, DestinationMap, LauncherKind, PlatformProfile, Target};
pub use settings::{
    ApplicationConfig, Arch, BundleSettings, Category, Inputs, LinuxSettings, MacOsSettings,
    Resources, RuntimePin, RuntimePins, RuntimeSlot, RuntimeSource, Settings, SettingsBuilder,
    TargetInputs, WindowsSettings,
};
