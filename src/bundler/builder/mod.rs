//! Bundle orchestration and coordination.
//!
//! This module provides the main [`Bundler`] orchestrator that runs the
//! per-target packaging pipelines.
//!
//! # Overview
//!
//! The bundler:
//! 1. Reads configuration from [`Settings`]
//! 2. Resolves the runtime releases the requested targets need
//! 3. Composes every target concurrently
//! 4. Calculates checksums and sizes of the written packages
//! 5. Returns a [`BundleReport`] of packaged, skipped and failed targets
//!
//! # Example
//!
//! ```no_run
//! use jvm_bundler::bundler::{ApplicationConfig, Bundler, SettingsBuilder, Target};
//!
//! # async fn example() -> jvm_bundler::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .output_directory("build/distributions")
//!     .application(ApplicationConfig {
//!         name: "Foo".into(),
//!         version: "1.0.0".into(),
//!         main_class: "com.example.Main".into(),
//!         ..Default::default()
//!     })
//!     .targets(vec![Target::Linux64])
//!     .build()?;
//!
//! let report = Bundler::new(settings).bundle().await?;
//! for artifact in report.artifacts {
//!     println!("Created: {} ({} bytes)", artifact.target, artifact.size);
//!     println!("SHA256: {}", artifact.checksum);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`Settings`]: crate::bundler::Settings

pub(crate) mod checksum;
mod orchestrator;
pub(crate) mod tool_detection;

pub use orchestrator::{BundleReport, BundledArtifact, Bundler, TargetOutcome};
