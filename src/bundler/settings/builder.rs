//! Builder for constructing Settings.

use super::{ApplicationConfig, BundleSettings, Settings};
use crate::bundler::{
    error::{Error, Result},
    platform::Target,
};
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// `build()` is the single validation point: every configuration error is
/// reported here, before any packaging work starts.
///
/// # Examples
///
/// ```no_run
/// use jvm_bundler::bundler::{ApplicationConfig, SettingsBuilder, Target};
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
///     .targets(vec![Target::Linux64, Target::MacOs])
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    application: Option<ApplicationConfig>,
    bundle_settings: BundleSettings,
    output_directory: Option<PathBuf>,
    cache_directory: Option<PathBuf>,
    targets: Vec<Target>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the application identity.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn application(mut self, application: ApplicationConfig) -> Self {
        self.application = Some(application);
        self
    }

    /// Sets inputs, resources and platform settings.
    ///
    /// Default: Empty [`BundleSettings`]
    pub fn bundle_settings(mut self, settings: BundleSettings) -> Self {
        self.bundle_settings = settings;
        self
    }

    /// Sets the directory receiving finished artifacts.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn output_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the runtime cache directory.
    ///
    /// Default: `<user cache dir>/jvm_bundler/runtimes`
    pub fn cache_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the targets to package.
    ///
    /// Default: every target
    pub fn targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if:
    /// - `application` or `output_directory` is unset
    /// - `name`, `version` or `main_class` is empty
    /// - `name` contains a path separator
    /// - a Windows target is requested without `resources.ico`
    /// - the Windows heap bounds are zero or inverted
    /// - `macos.signature` is not four ASCII characters
    pub fn build(self) -> Result<Settings> {
        let application = self
            .application
            .ok_or_else(|| Error::Configuration("application is required".into()))?;
        let output_directory = self
            .output_directory
            .ok_or_else(|| Error::Configuration("output_directory is required".into()))?;

        for (field, value) in [
            ("application.name", &application.name),
            ("application.version", &application.version),
            ("application.main_class", &application.main_class),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Configuration(format!("{field} is required")));
            }
        }
        if application.name.contains(['/', '\\']) {
            return Err(Error::Configuration(format!(
                "application.name must not contain path separators: {}",
                application.name
            )));
        }

        let mut targets = if self.targets.is_empty() {
            Target::all().to_vec()
        } else {
            self.targets
        };
        let mut seen = std::collections::HashSet::new();
        targets.retain(|t| seen.insert(*t));

        if targets.iter().any(|t| t.is_windows()) && self.bundle_settings.resources.ico.is_none()
        {
            return Err(Error::Configuration(
                "resources.ico is required for windows targets".into(),
            ));
        }

        let windows = &self.bundle_settings.windows;
        if windows.initial_heap_mb == 0 || windows.max_heap_mb == 0 {
            return Err(Error::Configuration("heap sizes must be positive".into()));
        }
        if windows.initial_heap_mb > windows.max_heap_mb {
            return Err(Error::Configuration(format!(
                "initial_heap_mb ({}) exceeds max_heap_mb ({})",
                windows.initial_heap_mb, windows.max_heap_mb
            )));
        }

        let signature = &self.bundle_settings.macos.signature;
        if signature.len() != 4 || !signature.is_ascii() {
            return Err(Error::Configuration(format!(
                "macos.signature must be four ASCII characters: {signature:?}"
            )));
        }

        let cache_directory = self.cache_directory.unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|dir| dir.join("jvm_bundler").join("runtimes"))
                .unwrap_or_else(|| output_directory.join(".jreCache"))
        });

        Ok(Settings::new(
            application,
            self.bundle_settings,
            output_directory,
            cache_directory,
            targets,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> ApplicationConfig {
        ApplicationConfig {
            name: "Foo".into(),
            version: "1.0".into(),
            main_class: "com.example.Main".into(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_to_every_target() {
        let settings = SettingsBuilder::new()
            .application(app())
            .output_directory("/tmp/out")
            .targets(vec![Target::Linux64, Target::Linux64, Target::MacOs])
            .build()
            .unwrap();
        assert_eq!(settings.targets(), &[Target::Linux64, Target::MacOs]);
    }

    #[test]
    fn missing_main_class_is_a_configuration_error() {
        let mut application = app();
        application.main_class.clear();
        let err = SettingsBuilder::new()
            .application(application)
            .output_directory("/tmp/out")
            .targets(vec![Target::Linux64])
            .build()
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("main_class"));
    }

    #[test]
    fn windows_targets_require_an_icon() {
        let err = SettingsBuilder::new()
            .application(app())
            .output_directory("/tmp/out")
            .targets(vec![Target::Windows64])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn inverted_heap_bounds_are_rejected() {
        let mut bundle = BundleSettings::default();
        bundle.windows.initial_heap_mb = 4096;
        bundle.resources.ico = Some("/icons/foo.ico".into());
        let err = SettingsBuilder::new()
            .application(app())
            .bundle_settings(bundle)
            .output_directory("/tmp/out")
            .targets(vec![Target::Windows32])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("initial_heap_mb"));
    }

    #[test]
    fn signature_must_be_four_characters() {
        let mut bundle = BundleSettings::default();
        bundle.macos.signature = "FOOBAR".into();
        let err = SettingsBuilder::new()
            .application(app())
            .bundle_settings(bundle)
            .output_directory("/tmp/out")
            .targets(vec![Target::MacOs])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("macos.signature"));
    }
}
