//! Top-level error types for the command-line front end.
//!
//! Library errors from the packaging pipeline are wrapped in
//! [`BundlerError::Bundler`]; everything the CLI itself can get wrong lives
//! in [`CliError`].

use thiserror::Error;

/// Result type alias for bundler operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all bundler operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Actionable hints printed below the error message.
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            BundlerError::Toml(_) => {
                vec!["Check bundle.toml against the documented tables".to_string()]
            }
            BundlerError::Bundler(e) if e.is_fatal() => {
                vec!["Fix the configuration value named above and rerun".to_string()]
            }
            BundlerError::Bundler(e) if e.is_skippable() => vec![
                "Provide the missing runtime, resource or tool, or request other targets"
                    .to_string(),
            ],
            _ => Vec::new(),
        }
    }

    /// Whether the error is a configuration problem rather than a failed build.
    pub fn is_configuration(&self) -> bool {
        match self {
            BundlerError::Cli(_) | BundlerError::Toml(_) => true,
            BundlerError::Bundler(e) => e.is_fatal(),
            _ => false,
        }
    }
}
