//! Deny-list pruning of runtime images.
//!
//! A [`DenyList`] removes paths from an image's membership. It never
//! touches file contents. The macOS and Windows profiles are the baseline
//! list extended with platform extras.

use super::RuntimeImage;
use crate::bundler::error::Result;
use glob::{MatchOptions, Pattern};

const BASELINE: &[&str] = &[
    "THIRDPARTYLICENSEREADME-JAVAFX.txt",
    "plugin/**",
    "lib/ext/access-bridge.jar",
    "lib/ext/access-bridge-32.jar",
    "lib/ext/access-bridge-64.jar",
    "lib/ext/cldrdata.jar",
    "lib/ext/jfxrt.jar",
    "lib/ext/localedata.jar",
    "lib/ext/nashorn.jar",
    "lib/ext/sunmscapi.jar",
    "lib/desktop/**",
    "lib/jfr/**",
    "lib/oblique-fonts/**",
    "lib/ant-javafx.jar",
    "lib/javafx.properties",
    "lib/javaws.jar",
    "lib/jfr.jar",
    "lib/jfxswt.jar",
];

const MACOS_EXTRA: &[&str] = &[
    "bin/**",
    "lib/libdecora_sse.dylib",
    "lib/libfxplugins.dylib",
    "lib/libglass.dylib",
    "lib/libglib-lite.dylib",
    "lib/libgstreamer-lite.dylib",
    "lib/libjavafx_font.dylib",
    "lib/libjavafx_font_t2k.dylib",
    "lib/libjavafx_iio.dylib",
    "lib/libjfxmedia.dylib",
    "lib/libjfxwebkit.dylib",
    "lib/libprism_common.dylib",
    "lib/libprism_es2.dylib",
    "lib/libprism_sw.dylib",
];

const WINDOWS_EXTRA: &[&str] = &[
    "bin/dtplugin/**",
    "bin/plugin2/**",
    "bin/jabswitch.exe",
    "bin/javacpl.exe",
    "bin/javaws.exe",
    "bin/jucheck.exe",
    "bin/kinit.exe",
    "bin/klist.exe",
    "bin/ktab.exe",
    "bin/orbd.exe",
    "bin/policytool.exe",
    "bin/keytool.exe",
    "bin/rmid.exe",
    "bin/rmiregistry.exe",
    "bin/servertool.exe",
    "bin/tnameserv.exe",
    "bin/javacpl.cpl",
    "lib/deploy/**",
    "lib/deploy.jar",
    "lib/plugin.jar",
    "bin/java_crw_demo.dll",
    "bin/JavaAccessBridge-32.dll",
    "bin/JavaAccessBridge.dll",
    "bin/JAWTAccessBridge-32.dll",
    "bin/JAWTAccessBridge.dll",
    "bin/WindowsAccessBridge-32.dll",
    "bin/WindowsAccessBridge.dll",
    "bin/wsdetect.dll",
    "bin/deploy.dll",
    "bin/jfr.dll",
    "bin/decora_sse.dll",
    "bin/fxplugins.dll",
    "bin/glass.dll",
    "bin/glib-lite.dll",
    "bin/gstreamer-lite.dll",
    "bin/javafx_font.dll",
    "bin/javafx_font_t2k.dll",
    "bin/javafx_iio.dll",
    "bin/jfxmedia.dll",
    "bin/jfxwebkit.dll",
    "bin/prism_common.dll",
    "bin/prism_d3d.dll",
    "bin/prism_es2.dll",
    "bin/prism_sw.dll",
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One exclusion rule, relative to the runtime home.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DenyRule {
    /// Every path below a directory (`dir/**`).
    Tree(String),
    /// Paths matching a glob; `*` does not cross `/`.
    File(Pattern),
}

impl DenyRule {
    /// Parses `dir/**` as a tree rule and anything else as a file glob.
    pub fn parse(pattern: &str) -> Result<Self> {
        match pattern.strip_suffix("/**") {
            Some(dir) => Ok(DenyRule::Tree(format!("{dir}/"))),
            None => Ok(DenyRule::File(Pattern::new(pattern)?)),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            DenyRule::Tree(prefix) => path.starts_with(prefix.as_str()),
            DenyRule::File(pattern) => pattern.matches_with(path, MATCH_OPTIONS),
        }
    }
}

/// Named deny-list profile applied by [`prune`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PruneProfile {
    /// Baseline plus macOS extras.
    MacOs,
    /// Baseline plus Windows extras.
    Windows,
}

impl PruneProfile {
    /// The deny list of this profile.
    pub fn deny_list(&self) -> Result<DenyList> {
        match self {
            PruneProfile::MacOs => DenyList::macos(),
            PruneProfile::Windows => DenyList::windows(),
        }
    }
}

/// Set of exclusion rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DenyList {
    rules: Vec<DenyRule>,
}

impl DenyList {
    /// Excludes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a list from textual patterns.
    pub fn from_patterns<S: AsRef<str>>(patterns: impl IntoIterator<Item = S>) -> Result<Self> {
        let rules = patterns
            .into_iter()
            .map(|p| DenyRule::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::empty().extend(Self { rules }))
    }

    /// Exclusions shared by every platform.
    pub fn baseline() -> Result<Self> {
        Self::from_patterns(BASELINE)
    }

    /// Baseline plus macOS-only exclusions.
    pub fn macos() -> Result<Self> {
        Ok(Self::baseline()?.extend(Self::from_patterns(MACOS_EXTRA)?))
    }

    /// Baseline plus Windows-only exclusions.
    pub fn windows() -> Result<Self> {
        Ok(Self::baseline()?.extend(Self::from_patterns(WINDOWS_EXTRA)?))
    }

    /// Union of both lists.
    pub fn extend(mut self, other: DenyList) -> Self {
        for rule in other.rules {
            if !self.rules.contains(&rule) {
                self.rules.push(rule);
            }
        }
        self
    }

    /// Whether a `/`-separated path relative to the runtime home is excluded.
    pub fn is_denied(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(path))
    }

    /// The rules in insertion order.
    pub fn rules(&self) -> &[DenyRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule is present.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Applies a platform profile to `image`.
///
/// Returns a new image over the same home whose deny list is the union of
/// the image's list and the profile's.
pub fn prune(image: &RuntimeImage, profile: PruneProfile) -> Result<RuntimeImage> {
    let deny = image.deny().clone().extend(profile.deny_list()?);
    log::debug!(
        "pruning {} with {:?} profile ({} rules)",
        image.home().display(),
        profile,
        deny.len()
    );
    Ok(RuntimeImage::new(image.home().to_path_buf(), deny))
}
