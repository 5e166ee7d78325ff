//! Runtime distribution pins.

use super::Arch;
use std::{fmt, path::PathBuf};

/// Identifies one bundled runtime per platform/architecture.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum RuntimeSlot {
    /// 64-bit macOS runtime
    MacOs,
    /// 32-bit Windows runtime
    Windows32,
    /// 64-bit Windows runtime
    Windows64,
}

impl RuntimeSlot {
    /// Cache directory key for this slot.
    pub fn key(&self) -> &'static str {
        match self {
            RuntimeSlot::MacOs => "macos",
            RuntimeSlot::Windows32 => "windows32",
            RuntimeSlot::Windows64 => "windows64",
        }
    }

    /// Architecture of the runtime held by this slot.
    pub fn arch(&self) -> Arch {
        match self {
            RuntimeSlot::MacOs | RuntimeSlot::Windows64 => Arch::X86_64,
            RuntimeSlot::Windows32 => Arch::X86,
        }
    }

    /// Whether the runtime targets macOS.
    pub fn is_macos(&self) -> bool {
        matches!(self, RuntimeSlot::MacOs)
    }
}

impl fmt::Display for RuntimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a runtime archive comes from.
///
/// ```toml
/// [runtime.windows64]
/// source = "ojdkbuild"
/// version = "1.8.0.131-1"
/// build = "1.8.0.131-1.b11"
/// ```
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(tag = "source")]
pub enum RuntimeSource {
    /// AdoptOpenJDK 8 release (`tar.gz` on macOS, `zip` on Windows).
    #[serde(rename = "adoptopenjdk")]
    AdoptOpenJdk {
        /// Release tag, e.g. "jdk8u144-b01"
        version: String,
    },

    /// ojdkbuild release (Windows only, `zip`).
    #[serde(rename = "ojdkbuild")]
    OjdkBuild {
        /// Release tag, e.g. "1.8.0.131-1"
        version: String,
        /// Build id embedded in the file name, e.g. "1.8.0.131-1.b11"
        build: String,
    },

    /// Pre-downloaded archive on the local filesystem.
    #[serde(rename = "archive")]
    Archive {
        /// Archive path (`.tar.gz`, `.tgz` or `.zip`)
        path: PathBuf,
        /// Glob matched against the archive's first path component.
        ///
        /// Default: `*`
        #[serde(default)]
        root: Option<String>,
        /// Cache key.
        ///
        /// Default: the archive file stem
        #[serde(default)]
        release: Option<String>,
    },
}

/// A runtime source plus an optional integrity pin.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize)]
pub struct RuntimePin {
    /// Archive origin.
    #[serde(flatten)]
    pub source: RuntimeSource,

    /// Expected SHA-256 of the archive (hex).
    #[serde(default)]
    pub sha256: Option<String>,
}

impl RuntimePin {
    /// Pin without checksum.
    pub fn new(source: RuntimeSource) -> Self {
        Self {
            source,
            sha256: None,
        }
    }
}

/// Runtime pins for every slot.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct RuntimePins {
    /// macOS runtime.
    ///
    /// Default: AdoptOpenJDK `jdk8u144-b01`
    pub macos: RuntimePin,

    /// 32-bit Windows runtime.
    ///
    /// Default: ojdkbuild `1.8.0.131-1` / `1.8.0.131-1.b11`
    pub windows32: RuntimePin,

    /// 64-bit Windows runtime.
    ///
    /// Default: ojdkbuild `1.8.0.131-1` / `1.8.0.131-1.b11`
    pub windows64: RuntimePin,
}

/// Default AdoptOpenJDK release tag.
pub const DEFAULT_ADOPTOPENJDK_VERSION: &str = "jdk8u144-b01";
/// Default ojdkbuild release tag.
pub const DEFAULT_OJDKBUILD_VERSION: &str = "1.8.0.131-1";
/// Default ojdkbuild build id.
pub const DEFAULT_OJDKBUILD_BUILD: &str = "1.8.0.131-1.b11";

impl Default for RuntimePins {
    fn default() -> Self {
        let ojdkbuild = RuntimePin::new(RuntimeSource::OjdkBuild {
            version: DEFAULT_OJDKBUILD_VERSION.into(),
            build: DEFAULT_OJDKBUILD_BUILD.into(),
        });
        Self {
            macos: RuntimePin::new(RuntimeSource::AdoptOpenJdk {
                version: DEFAULT_ADOPTOPENJDK_VERSION.into(),
            }),
            windows32: ojdkbuild.clone(),
            windows64: ojdkbuild,
        }
    }
}

impl RuntimePins {
    /// Returns the pin configured for a slot.
    pub fn get(&self, slot: RuntimeSlot) -> &RuntimePin {
        match slot {
            RuntimeSlot::MacOs => &self.macos,
            RuntimeSlot::Windows32 => &self.windows32,
            RuntimeSlot::Windows64 => &self.windows64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_deserialize_with_flattened_source() {
        let pins: RuntimePins = toml::from_str(
            r#"
            [macos]
            source = "archive"
            path = "/opt/jre/mac.tar.gz"
            sha256 = "abc"

            [windows64]
            source = "adoptopenjdk"
            version = "jdk8u152-b16"
            "#,
        )
        .unwrap();

        assert_eq!(pins.macos.sha256.as_deref(), Some("abc"));
        assert!(matches!(pins.macos.source, RuntimeSource::Archive { .. }));
        assert_eq!(
            pins.windows64.source,
            RuntimeSource::AdoptOpenJdk {
                version: "jdk8u152-b16".into()
            }
        );
        assert_eq!(pins.windows32, RuntimePins::default().windows32);
    }
}
