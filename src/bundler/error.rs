//! Error types for packaging operations.
//!
//! Provides contextual error chaining, filesystem-specific errors and the
//! packaging error taxonomy used by the orchestrator to decide whether a
//! target is skipped, failed, or aborts the whole run.
//!
//! # Features
//!
//! - **Context trait**: Prefix errors with the step that failed
//! - **ErrorExt trait**: Filesystem operations with automatic path context
//! - **Classification**: [`Error::is_skippable`] and [`Error::is_fatal`]
//!
//! # Example
//!
//! ```no_run
//! use jvm_bundler::bundler::{Context, ErrorExt, Result};
//! use std::path::Path;
//!
//! fn read_launcher(path: &Path) -> Result<Vec<u8>> {
//!     std::fs::read(path)
//!         .fs_context("reading launcher stub", path)
//!         .context("loading macOS launcher")
//! }
//! ```

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
    sync::Arc,
};
use thiserror::Error as DeriveError;

/// Errors returned by the packaging pipeline.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "reading jar")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Child process could not be spawned.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// A required configuration value or generator input is missing or invalid.
    ///
    /// Fatal: the run stops before producing any output.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Runtime archive transfer did not complete.
    #[error("download of {url} failed: {reason}")]
    Download {
        /// Source URL
        url: String,
        /// Transport or status failure
        reason: String,
    },

    /// Runtime archive is corrupt or does not contain the expected root.
    #[error("unpacking {} failed: {reason}", archive.display())]
    Unpack {
        /// Archive being unpacked
        archive: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Downloaded archive does not match its pinned checksum.
    #[error("hash mismatch of downloaded file: expected {expected}, got {actual}")]
    HashMismatch {
        /// Expected hash value
        expected: String,
        /// Actual hash value
        actual: String,
    },

    /// Two sources map to the same destination in a package layout with different content.
    #[error("conflicting sources for {destination}: {existing} and {incoming}")]
    Conflict {
        /// Destination-relative path
        destination: String,
        /// Source already in the layout
        existing: String,
        /// Source that was being inserted
        incoming: String,
    },

    /// Two native-library archives carry different files with the same name.
    #[error("native library {name} is provided with different content by {first} and {second}")]
    NativeCollision {
        /// Flattened library file name
        name: String,
        /// First provider
        first: String,
        /// Second provider
        second: String,
    },

    /// External tool (wrapper or installer compiler) exited unsuccessfully.
    #[error("{tool} exited with {status}")]
    ExternalTool {
        /// Tool name
        tool: String,
        /// Exit status description
        status: String,
    },

    /// External tool is not installed on this host.
    #[error("{0} is not available on this host")]
    ToolUnavailable(String),

    /// A resource file required by a target is absent.
    #[error("missing resource: {0}")]
    ResourceMissing(String),

    /// Error shared between several targets waiting on the same value.
    #[error("{0}")]
    Shared(Arc<Error>),

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Error walking directory.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// ZIP archive reading/writing error.
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Handlebars template rendering error.
    #[error("{0}")]
    HandleBarsError(#[from] handlebars::RenderError),

    /// Handlebars template parsing error.
    #[error("{0}")]
    Template(#[from] handlebars::TemplateError),

    /// JSON serialization error.
    #[error("{0}")]
    JsonError(#[from] serde_json::error::Error),

    /// Regular expression error (native library patterns).
    #[error("{0}")]
    RegexError(#[from] regex::Error),

    /// Invalid glob pattern (deny lists, archive roots).
    #[error("{0}")]
    GlobPattern(#[from] glob::PatternError),

    /// URL parsing error.
    #[error("{0}")]
    UrlParse(#[from] url::ParseError),

    /// Property list (plist) writing error.
    #[error("{0}")]
    Plist(#[from] plist::Error),

    /// XML serialization error.
    #[error("{0}")]
    Xml(#[from] serde_xml_rs::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Whether this error means "the target cannot be built in this environment".
    ///
    /// Skippable errors degrade to a warning at the orchestration level.
    pub fn is_skippable(&self) -> bool {
        match self {
            Error::Download { .. }
            | Error::Unpack { .. }
            | Error::HashMismatch { .. }
            | Error::ToolUnavailable(_)
            | Error::ResourceMissing(_) => true,
            Error::Context(_, inner) => inner.is_skippable(),
            Error::Shared(inner) => inner.is_skippable(),
            _ => false,
        }
    }

    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Configuration(_) => true,
            Error::Context(_, inner) => inner.is_fatal(),
            Error::Shared(inner) => inner.is_fatal(),
            _ => false,
        }
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// The wrapped error keeps its classification.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying jar".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_errors_are_skippable_through_context() {
        let err = Error::Download {
            url: "https://example.invalid/jdk.tar.gz".into(),
            reason: "connection refused".into(),
        };
        let wrapped: Result<()> = Err(err);
        let wrapped = wrapped.context("fetching macos runtime").unwrap_err();
        assert!(wrapped.is_skippable());
        assert!(!wrapped.is_fatal());
    }

    #[test]
    fn shared_errors_keep_their_category() {
        let shared = Error::Shared(Arc::new(Error::Configuration("name is required".into())));
        assert!(shared.is_fatal());
        assert!(!shared.is_skippable());
    }

    #[test]
    fn external_tool_failures_are_neither_skipped_nor_fatal() {
        let err = Error::ExternalTool {
            tool: "launch4j".into(),
            status: "exit status: 1".into(),
        };
        assert!(!err.is_skippable());
        assert!(!err.is_fatal());
    }
}
