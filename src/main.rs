//! JVM Bundler - packages JVM applications for Linux, macOS and Windows.
//!
//! This binary reads `bundle.toml`, builds the requested platform packages
//! and reports which targets were packaged, skipped or failed.

use jvm_bundler::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {}", suggestion);
            }
            1
        }
    };

    process::exit(exit_code);
}
