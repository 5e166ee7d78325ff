//! Bundle inputs and resource locations.

use super::{LinuxSettings, MacOsSettings, WindowsSettings};
use crate::bundler::platform::Target;
use std::{collections::BTreeMap, path::PathBuf};

/// Input files for one target in addition to the shared inputs.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct TargetInputs {
    /// Runtime-only jars for this target.
    pub jars: Vec<PathBuf>,

    /// Native-library archives or loose libraries for this target.
    pub natives: Vec<PathBuf>,
}

/// Resolved input files supplied by the build.
///
/// # Configuration
///
/// ```toml
/// [inputs]
/// jars = ["build/libs/foo.jar"]
/// natives = ["libs/natives-common.jar"]
///
/// [inputs.targets.windows64]
/// natives = ["libs/natives-windows-x64.jar"]
/// ```
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Inputs {
    /// Application jars shipped with every target.
    pub jars: Vec<PathBuf>,

    /// Native-library archives scanned for every target.
    pub natives: Vec<PathBuf>,

    /// Per-target additions.
    pub targets: BTreeMap<Target, TargetInputs>,
}

impl Inputs {
    /// Shared jars followed by the target's own jars.
    pub fn jars_for(&self, target: Target) -> Vec<PathBuf> {
        let mut jars = self.jars.clone();
        if let Some(extra) = self.targets.get(&target) {
            jars.extend(extra.jars.iter().cloned());
        }
        jars
    }

    /// Only the target's own jars.
    pub fn target_jars(&self, target: Target) -> Vec<PathBuf> {
        self.targets
            .get(&target)
            .map(|extra| extra.jars.clone())
            .unwrap_or_default()
    }

    /// Shared native archives followed by the target's own.
    pub fn natives_for(&self, target: Target) -> Vec<PathBuf> {
        let mut natives = self.natives.clone();
        if let Some(extra) = self.targets.get(&target) {
            natives.extend(extra.natives.iter().cloned());
        }
        natives
    }
}

/// Resource files consumed by individual targets.
///
/// Every entry is optional at load time; targets that need a missing
/// resource are skipped with a warning.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Resources {
    /// macOS icon, copied to `Contents/Resources/Icon.icns`.
    pub icns: Option<PathBuf>,

    /// Windows icon embedded by the executable wrapper.
    ///
    /// Required when any Windows target is requested.
    pub ico: Option<PathBuf>,

    /// macOS launcher stub binary (`Contents/MacOS/<name>`).
    pub mac_launcher: Option<PathBuf>,

    /// `Localizable.strings` for `Contents/Resources/en.lproj`.
    ///
    /// Default: a built-in English table
    pub localizable_strings: Option<PathBuf>,

    /// Application manifest embedded by the executable wrapper.
    ///
    /// Default: a built-in manifest
    pub windows_manifest: Option<PathBuf>,

    /// `launch4j.jar`; when unset, `launch4j` is looked up on `PATH`.
    pub launch4j: Option<PathBuf>,

    /// Inno Setup script staged as `Setup.iss`.
    pub inno_script: Option<PathBuf>,

    /// Directory whose contents are staged under `install/`.
    pub installer_dir: Option<PathBuf>,

    /// Directory whose contents are staged next to `Setup.iss`, e.g. license
    /// text and wizard images the script references by bare name.
    pub installer_resources: Option<PathBuf>,

    /// Inno Setup compiler; when unset, `iscc` is looked up on `PATH`.
    pub inno_compiler: Option<PathBuf>,
}

/// Bundle configuration for all targets.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct BundleSettings {
    /// Input files.
    pub inputs: Inputs,

    /// Resource files.
    pub resources: Resources,

    /// Linux settings.
    pub linux: LinuxSettings,

    /// Windows settings.
    pub windows: WindowsSettings,

    /// macOS settings.
    pub macos: MacOsSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_inputs_extend_shared_inputs() {
        let mut inputs = Inputs {
            jars: vec!["app.jar".into()],
            natives: vec!["natives.jar".into()],
            ..Default::default()
        };
        inputs.targets.insert(
            Target::Windows64,
            TargetInputs {
                jars: vec!["win.jar".into()],
                natives: vec!["natives-win64.jar".into()],
            },
        );

        assert_eq!(
            inputs.jars_for(Target::Windows64),
            vec![PathBuf::from("app.jar"), PathBuf::from("win.jar")]
        );
        assert_eq!(inputs.jars_for(Target::Linux64), vec![PathBuf::from("app.jar")]);
        assert_eq!(inputs.target_jars(Target::Windows64), vec![PathBuf::from("win.jar")]);
        assert_eq!(inputs.natives_for(Target::Windows64).len(), 2);
    }
}
