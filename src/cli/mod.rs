//! Command line interface for the JVM bundler.
//!
//! Loads `bundle.toml`, applies command-line overrides, runs the
//! [`Bundler`] and prints its report.

mod args;
mod output;

pub use args::Args;
pub use output::OutputManager;

use crate::{
    bundler::Bundler,
    error::{CliError, Result},
    metadata::load_manifest,
};

/// Main CLI entry point
///
/// Returns the process exit code: 0 when no target failed, 1 otherwise.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;
    execute(&args).await
}

/// Runs a packaging pass for already-parsed arguments.
pub async fn execute(args: &Args) -> Result<i32> {
    let mut manifest = load_manifest(&args.config)?;
    log::debug!("Loaded {}", manifest.path.display());

    let macos = &mut manifest.bundle_settings.macos;
    macos.jvm_options.extend(
        args.extra_jvm_options()
            .map_err(|reason| CliError::InvalidArguments { reason })?,
    );
    macos.jvm_default_options.extend(
        args.extra_jvm_default_options()
            .map_err(|reason| CliError::InvalidArguments { reason })?,
    );

    let mut builder = manifest.settings_builder().targets(args.targets.clone());
    if let Some(dir) = &args.output_dir {
        builder = builder.output_directory(dir);
    }
    if let Some(dir) = &args.cache_dir {
        builder = builder.cache_directory(dir);
    }
    let settings = builder.build()?;

    let report = Bundler::new(settings).bundle().await?;
    OutputManager::new(args.json, args.quiet).report(&report)?;
    Ok(if report.is_success() { 0 } else { 1 })
}

/// Validate arguments without executing (for testing)
pub fn validate_args(args: &Args) -> std::result::Result<(), String> {
    args.validate()
}
