//! Application identity record shared by every packaging target.

use super::runtime::RuntimePins;
use std::fmt;

/// Application category.
///
/// Maps onto `LSApplicationCategoryType` for macOS bundles.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Developer tools
    Development,
    /// Games
    Game,
    /// Graphics and design
    Graphics,
    /// Networking and social
    Internet,
    /// Audio/video and entertainment
    Multimedia,
    /// Productivity
    Office,
    /// Everything else
    #[default]
    Utility,
}

impl Category {
    /// Returns the `public.app-category.*` identifier for this category.
    pub fn macos_category(&self) -> &'static str {
        match self {
            Category::Development => "public.app-category.developer-tools",
            Category::Game => "public.app-category.games",
            Category::Graphics => "public.app-category.graphics-design",
            Category::Internet => "public.app-category.social-networking",
            Category::Multimedia => "public.app-category.entertainment",
            Category::Office => "public.app-category.productivity",
            Category::Utility => "public.app-category.utilities",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Development => "development",
            Category::Game => "game",
            Category::Graphics => "graphics",
            Category::Internet => "internet",
            Category::Multimedia => "multimedia",
            Category::Office => "office",
            Category::Utility => "utility",
        };
        f.write_str(name)
    }
}

/// Application identity and launch configuration.
///
/// Created once per packaging run, validated by [`SettingsBuilder::build`],
/// and read-only afterwards.
///
/// # Configuration
///
/// ```toml
/// [application]
/// name = "Foo"
/// full_name = "Foo Game"
/// version = "1.2.3"
/// company = "Example"
/// main_class = "com.example.Main"
/// category = "game"
/// ```
///
/// [`SettingsBuilder::build`]: super::SettingsBuilder::build
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Short name used for archive names, executables and the bundle name.
    ///
    /// Required.
    pub name: String,

    /// Human-readable name shown to users.
    ///
    /// Default: `name`
    pub full_name: Option<String>,

    /// Version string, e.g. "1.2.3".
    ///
    /// Required.
    pub version: String,

    /// Publisher, written into Win32 version resources and the installer.
    pub company: String,

    /// Homepage URL.
    pub url: String,

    /// Copyright notice.
    pub copyright: String,

    /// Application category.
    ///
    /// Default: [`Category::Utility`]
    pub category: Category,

    /// Installer application id.
    ///
    /// Default: a UUID v5 derived from `name`, stable across runs.
    pub uuid: Option<String>,

    /// Fully qualified main class.
    ///
    /// Required.
    pub main_class: String,

    /// Bundle identifier in reverse domain notation.
    ///
    /// Default: `main_class`
    pub identifier: Option<String>,

    /// Run out of a per-user directory instead of the install location.
    ///
    /// POSIX launchers `cd` into `~/.<exec name>`, Windows executables set
    /// `user.dir` under `%APPDATA%`, macOS bundles set `WorkingDirectoryInLibrary`.
    pub working_directory_in_library: bool,

    /// Runtime distributions pinned per runtime slot.
    #[serde(skip)]
    pub runtimes: RuntimePins,
}

impl ApplicationConfig {
    /// Returns the display name, falling back to `name`.
    pub fn full_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.name)
    }

    /// Returns the bundle identifier, falling back to the main class.
    pub fn identifier(&self) -> &str {
        self.identifier.as_deref().unwrap_or(&self.main_class)
    }

    /// Returns the installer application id.
    pub fn uuid(&self) -> String {
        match &self.uuid {
            Some(uuid) => uuid.clone(),
            None => uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, self.name.as_bytes())
                .to_string(),
        }
    }

    /// Name of the POSIX executable (lowercase application name).
    pub fn exec_name(&self) -> String {
        self.name.to_lowercase()
    }
}
