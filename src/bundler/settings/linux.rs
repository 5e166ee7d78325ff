//! Linux platform-specific settings.

/// Linux tarball configuration.
///
/// The tarball mirrors the install location: jars and natives under
/// `lib_path`, the launcher script under `bin_path`.
///
/// # Configuration
///
/// ```toml
/// [linux]
/// lib_path = "/opt/foo/lib"
/// bin_path = "/opt/foo/bin"
/// ```
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LinuxSettings {
    /// Install directory for jars and native libraries.
    ///
    /// Default: `/usr/share/java/<lowercase name>`
    pub lib_path: Option<String>,

    /// Install directory for the launcher script.
    ///
    /// Default: `/usr/bin`
    pub bin_path: Option<String>,
}

impl LinuxSettings {
    /// Resolved library directory.
    pub fn lib_path(&self, exec_name: &str) -> String {
        self.lib_path
            .clone()
            .unwrap_or_else(|| format!("/usr/share/java/{exec_name}"))
    }

    /// Resolved launcher directory.
    pub fn bin_path(&self) -> String {
        self.bin_path.clone().unwrap_or_else(|| "/usr/bin".into())
    }
}
