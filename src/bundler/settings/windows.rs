//! Windows platform-specific settings.

/// Windows executable wrapper configuration.
///
/// # Configuration
///
/// ```toml
/// [windows]
/// initial_heap_mb = 128
/// max_heap_mb = 4096
/// ```
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct WindowsSettings {
    /// Initial JVM heap in megabytes.
    ///
    /// Default: 64
    pub initial_heap_mb: u32,

    /// Maximum JVM heap in megabytes.
    ///
    /// Default: 2048
    pub max_heap_mb: u32,
}

impl Default for WindowsSettings {
    fn default() -> Self {
        Self {
            initial_heap_mb: 64,
            max_heap_mb: 2048,
        }
    }
}
