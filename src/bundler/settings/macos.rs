//! macOS platform-specific settings.

use crate::bundler::plist::{BundleDocument, PlistEntry, TypeDeclaration};
use std::collections::BTreeMap;

/// JVM options written to `Info.plist` when none are configured.
pub const DEFAULT_JVM_OPTIONS: &[&str] = &[
    "-XstartOnFirstThread",
    "-Xms64M",
    "-Xmx2048M",
    "-XX:+UseG1GC",
    "-XX:MaxGCPauseMillis=1",
    "-Xdock:icon=Contents/Resources/Icon.icns",
];

/// macOS application bundle configuration.
///
/// Everything here ends up in `Contents/Info.plist`.
///
/// # Configuration
///
/// ```toml
/// [macos]
/// minimum_system_version = "10.9"
/// protocols = ["foo"]
/// jvm_default_options = { "-Dapple.awt.application.name" = "Foo" }
/// environment = { FOO_HOME = "~/Library/Foo" }
///
/// [[macos.document_types]]
/// name = "Foo Save"
/// extensions = ["foosave"]
/// ```
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct MacOsSettings {
    /// Four-character creator code for `CFBundleSignature` and `PkgInfo`.
    ///
    /// Default: "????"
    pub signature: String,

    /// `LSMinimumSystemVersion`.
    ///
    /// Default: None (omitted)
    pub minimum_system_version: Option<String>,

    /// `LSArchitecturePriority`.
    ///
    /// Default: `["x86_64"]`
    pub architectures: Vec<String>,

    /// Writes `LSUIElement` so the app has no dock icon.
    pub hide_dock_icon: bool,

    /// Writes `NSHighResolutionCapable`.
    ///
    /// Default: true
    pub high_resolution: bool,

    /// Writes `NSSupportsAutomaticGraphicsSwitching`.
    ///
    /// Default: true
    pub automatic_graphics_switching: bool,

    /// URL schemes registered under `CFBundleURLTypes`.
    pub protocols: Vec<String>,

    /// Bare JVM options (`JVMOptions`).
    ///
    /// Default: [`DEFAULT_JVM_OPTIONS`]
    pub jvm_options: Vec<String>,

    /// Keyed JVM options (`JVMDefaultOptions`).
    pub jvm_default_options: BTreeMap<String, String>,

    /// Program arguments (`JVMArguments`).
    pub jvm_arguments: Vec<String>,

    /// Extra `LSEnvironment` entries (after `LC_CTYPE`).
    pub environment: BTreeMap<String, String>,

    /// `CFBundleDocumentTypes`.
    pub document_types: Vec<BundleDocument>,

    /// `UTExportedTypeDeclarations`.
    pub exported_types: Vec<TypeDeclaration>,

    /// `UTImportedTypeDeclarations`.
    pub imported_types: Vec<TypeDeclaration>,

    /// Arbitrary trailing entries.
    pub extra_entries: Vec<PlistEntry>,
}

impl Default for MacOsSettings {
    fn default() -> Self {
        Self {
            signature: "????".into(),
            minimum_system_version: None,
            architectures: vec!["x86_64".into()],
            hide_dock_icon: false,
            high_resolution: true,
            automatic_graphics_switching: true,
            protocols: Vec::new(),
            jvm_options: DEFAULT_JVM_OPTIONS.iter().map(|s| s.to_string()).collect(),
            jvm_default_options: BTreeMap::new(),
            jvm_arguments: Vec::new(),
            environment: BTreeMap::new(),
            document_types: Vec::new(),
            exported_types: Vec::new(),
            imported_types: Vec::new(),
            extra_entries: Vec::new(),
        }
    }
}
