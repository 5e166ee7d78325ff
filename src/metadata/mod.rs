//! Packaging configuration loaded from `bundle.toml`.
//!
//! Every relative path in the file is resolved against the directory that
//! contains it, so the build glue can write the file anywhere.

use crate::bundler::{
    ApplicationConfig, BundleSettings, Inputs, LinuxSettings, MacOsSettings, Resources,
    RuntimePins, RuntimeSource, SettingsBuilder, WindowsSettings,
};
use crate::error::{BundlerError, CliError, Result};
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default output directory, relative to the configuration file.
pub const DEFAULT_OUTPUT_DIR: &str = "build/distributions";

/// `[runtime]` table: cache location plus one pin per slot.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RuntimeTable {
    cache_dir: Option<PathBuf>,
    #[serde(flatten)]
    pins: RuntimePins,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    application: ApplicationConfig,
    #[serde(default)]
    inputs: Inputs,
    #[serde(default)]
    runtime: RuntimeTable,
    #[serde(default)]
    resources: Resources,
    #[serde(default)]
    linux: LinuxSettings,
    #[serde(default)]
    windows: WindowsSettings,
    #[serde(default)]
    macos: MacOsSettings,
}

/// Parsed and path-resolved `bundle.toml`.
#[derive(Debug)]
pub struct BundleManifest {
    /// Absolute path of the file.
    pub path: PathBuf,

    /// Application identity, including the runtime pins.
    pub application: ApplicationConfig,

    /// Inputs, resources and platform settings.
    pub bundle_settings: BundleSettings,

    /// Runtime cache directory, if configured.
    pub cache_dir: Option<PathBuf>,
}

impl BundleManifest {
    /// Directory containing the file.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("/"))
    }

    /// Settings builder preloaded with this manifest.
    ///
    /// Output defaults to `build/distributions` next to the file.
    pub fn settings_builder(&self) -> SettingsBuilder {
        let builder = SettingsBuilder::new()
            .application(self.application.clone())
            .bundle_settings(self.bundle_settings.clone())
            .output_directory(self.base_dir().join(DEFAULT_OUTPUT_DIR));
        match &self.cache_dir {
            Some(dir) => builder.cache_directory(dir),
            None => builder,
        }
    }
}

/// Reads and resolves `bundle.toml`.
pub fn load_manifest(config_path: &Path) -> Result<BundleManifest> {
    let path = config_path.absolutize()?.into_owned();
    let text = std::fs::read_to_string(&path).map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "read_bundle_toml".to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
        })
    })?;
    let base = path
        .parent()
        .ok_or_else(|| {
            BundlerError::Cli(CliError::InvalidArguments {
                reason: format!("Invalid configuration path {}", path.display()),
            })
        })?
        .to_path_buf();
    parse_manifest(&text, &base, path)
}

/// Parses `text` as `bundle.toml`, resolving paths against `base`.
pub fn parse_manifest(text: &str, base: &Path, path: PathBuf) -> Result<BundleManifest> {
    let raw: RawManifest = toml::from_str(text)?;

    let mut application = raw.application;
    application.runtimes = raw.runtime.pins;
    for pin in [
        &mut application.runtimes.macos,
        &mut application.runtimes.windows32,
        &mut application.runtimes.windows64,
    ] {
        if let RuntimeSource::Archive { path, .. } = &mut pin.source {
            resolve(base, path)?;
        }
    }

    let mut bundle_settings = BundleSettings {
        inputs: raw.inputs,
        resources: raw.resources,
        linux: raw.linux,
        windows: raw.windows,
        macos: raw.macos,
    };
    resolve_inputs(base, &mut bundle_settings.inputs)?;
    resolve_resources(base, &mut bundle_settings.resources)?;

    let cache_dir = match raw.runtime.cache_dir {
        Some(mut dir) => {
            resolve(base, &mut dir)?;
            Some(dir)
        }
        None => None,
    };

    Ok(BundleManifest {
        path,
        application,
        bundle_settings,
        cache_dir,
    })
}

fn resolve(base: &Path, path: &mut PathBuf) -> Result<()> {
    *path = path.absolutize_from(base)?.into_owned();
    Ok(())
}

fn resolve_all(base: &Path, paths: &mut [PathBuf]) -> Result<()> {
    paths.iter_mut().try_for_each(|p| resolve(base, p))
}

fn resolve_inputs(base: &Path, inputs: &mut Inputs) -> Result<()> {
    resolve_all(base, &mut inputs.jars)?;
    resolve_all(base, &mut inputs.natives)?;
    for extra in inputs.targets.values_mut() {
        resolve_all(base, &mut extra.jars)?;
        resolve_all(base, &mut extra.natives)?;
    }
    Ok(())
}

fn resolve_resources(base: &Path, resources: &mut Resources) -> Result<()> {
    for path in [
        &mut resources.icns,
        &mut resources.ico,
        &mut resources.mac_launcher,
        &mut resources.localizable_strings,
        &mut resources.windows_manifest,
        &mut resources.launch4j,
        &mut resources.inno_script,
        &mut resources.installer_dir,
        &mut resources.installer_resources,
        &mut resources.inno_compiler,
    ]
    .into_iter()
    .flatten()
    {
        resolve(base, path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{Category, RuntimeSlot, Target};

    const MANIFEST: &str = r#"
        [application]
        name = "Foo"
        full_name = "Foo Game"
        version = "1.2.3"
        main_class = "com.example.Main"
        category = "game"

        [inputs]
        jars = ["build/libs/foo.jar"]
        natives = ["/abs/natives-linux.jar"]

        [inputs.targets.windows64]
        natives = ["libs/natives-windows-x64.jar"]

        [runtime]
        cache_dir = ".jreCache"

        [runtime.macos]
        source = "archive"
        path = "jre/mac.tar.gz"
        root = "jdk*"

        [resources]
        ico = "icons/Icon.ico"
        installer_resources = "Install/Windows/resources"

        [windows]
        max_heap_mb = 4096

        [macos]
        protocols = ["foo"]
    "#;

    #[test]
    fn relative_paths_resolve_against_the_file() {
        let manifest =
            parse_manifest(MANIFEST, Path::new("/project"), "/project/bundle.toml".into()).unwrap();

        let inputs = &manifest.bundle_settings.inputs;
        assert_eq!(inputs.jars, vec![PathBuf::from("/project/build/libs/foo.jar")]);
        assert_eq!(inputs.natives, vec![PathBuf::from("/abs/natives-linux.jar")]);
        assert_eq!(
            inputs.natives_for(Target::Windows64)[1],
            PathBuf::from("/project/libs/natives-windows-x64.jar")
        );
        assert_eq!(
            manifest.bundle_settings.resources.ico.as_deref(),
            Some(Path::new("/project/icons/Icon.ico"))
        );
        assert_eq!(
            manifest.bundle_settings.resources.installer_resources.as_deref(),
            Some(Path::new("/project/Install/Windows/resources"))
        );
        assert_eq!(manifest.cache_dir.as_deref(), Some(Path::new("/project/.jreCache")));
    }

    #[test]
    fn runtime_pins_fill_the_application() {
        let manifest =
            parse_manifest(MANIFEST, Path::new("/project"), "/project/bundle.toml".into()).unwrap();
        let app = &manifest.application;
        assert_eq!(app.category, Category::Game);
        match &app.runtimes.get(RuntimeSlot::MacOs).source {
            RuntimeSource::Archive { path, root, .. } => {
                assert_eq!(path, Path::new("/project/jre/mac.tar.gz"));
                assert_eq!(root.as_deref(), Some("jdk*"));
            }
            other => panic!("unexpected source: {other:?}"),
        }
        assert_eq!(app.runtimes.windows64, RuntimePins::default().windows64);
        assert_eq!(manifest.bundle_settings.windows.max_heap_mb, 4096);
        assert_eq!(manifest.bundle_settings.windows.initial_heap_mb, 64);
    }

    #[test]
    fn settings_default_to_build_distributions() {
        let manifest =
            parse_manifest(MANIFEST, Path::new("/project"), "/project/bundle.toml".into()).unwrap();
        let settings = manifest
            .settings_builder()
            .targets(vec![Target::Linux64])
            .build()
            .unwrap();
        assert_eq!(
            settings.output_directory(),
            Path::new("/project/build/distributions")
        );
        assert_eq!(settings.cache_directory(), Path::new("/project/.jreCache"));
    }

    #[test]
    fn missing_application_table_is_an_error() {
        let err = parse_manifest("[inputs]\njars = []\n", Path::new("/p"), "/p/bundle.toml".into())
            .unwrap_err();
        assert!(matches!(err, BundlerError::Toml(_)));
    }
}
