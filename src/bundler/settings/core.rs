//! Core Settings struct and implementations.

use super::{ApplicationConfig, BundleSettings};
use crate::bundler::platform::Target;
use std::path::{Path, PathBuf};

/// Main settings for packaging operations.
///
/// Central configuration for the bundler, constructed via [`SettingsBuilder`].
///
/// # Examples
///
/// ```no_run
/// use jvm_bundler::bundler::{ApplicationConfig, SettingsBuilder};
///
/// # fn example() -> jvm_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .output_directory("build/distributions")
///     .application(ApplicationConfig {
///         name: "Foo".into(),
///         version: "1.0.0".into(),
///         main_class: "com.example.Main".into(),
///         ..Default::default()
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// [`SettingsBuilder`]: super::SettingsBuilder
#[derive(Clone, Debug)]
pub struct Settings {
    application: ApplicationConfig,
    bundle_settings: BundleSettings,
    output_directory: PathBuf,
    cache_directory: PathBuf,
    targets: Vec<Target>,
}

impl Settings {
    pub(super) fn new(
        application: ApplicationConfig,
        bundle_settings: BundleSettings,
        output_directory: PathBuf,
        cache_directory: PathBuf,
        targets: Vec<Target>,
    ) -> Self {
        Self {
            application,
            bundle_settings,
            output_directory,
            cache_directory,
            targets,
        }
    }

    /// Returns the application identity.
    pub fn application(&self) -> &ApplicationConfig {
        &self.application
    }

    /// Returns the bundle configuration.
    pub fn bundle_settings(&self) -> &BundleSettings {
        &self.bundle_settings
    }

    /// Directory receiving the finished archives and installers.
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Root of the runtime download cache.
    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    /// Targets requested for this run, in request order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Output file path for a target.
    pub fn artifact_path(&self, target: Target) -> PathBuf {
        self.output_directory
            .join(target.artifact_name(&self.application.name, &self.application.version))
    }
}
