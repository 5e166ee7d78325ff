//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation
//! that runs before any configuration is loaded.

use crate::bundler::{Target, utils::args::{split_list, split_map}};
use clap::Parser;
use std::{collections::BTreeMap, path::PathBuf};

/// Packages a JVM application for Linux, macOS and Windows
#[derive(Parser, Debug)]
#[command(
    name = "jvm_bundler",
    version,
    about = "Packages a JVM application for Linux, macOS and Windows",
    long_about = "Assembles application jars, native libraries and a bundled Java runtime into
platform packages: Linux tarballs, a macOS .app bundle, Windows zips and an Inno Setup installer.

Usage:
  jvm_bundler --config bundle.toml
  jvm_bundler --config bundle.toml --target linux64 --target macos
  jvm_bundler --target windows64 --output-dir dist --json

Targets that cannot be built here (no runtime download, missing resource or tool) are skipped
with a warning. Exit code 0 = no requested target failed."
)]
pub struct Args {
    /// Packaging configuration file
    #[arg(short, long, value_name = "PATH", default_value = "bundle.toml")]
    pub config: PathBuf,

    /// Target to build (repeatable): linux32, linux64, macos, windows32, windows64, windows-installer
    ///
    /// Default: every target
    #[arg(short, long = "target", value_name = "TARGET", value_parser = parse_target)]
    pub targets: Vec<Target>,

    /// Directory receiving the packages
    ///
    /// Default: build/distributions next to the configuration file
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Runtime download cache
    #[arg(long, value_name = "DIR", env = "JVM_BUNDLER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Extra macOS JVM options, comma-separated (`\,` escapes a comma)
    #[arg(long = "jvm-option", value_name = "LIST", allow_hyphen_values = true)]
    pub jvm_options: Vec<String>,

    /// Extra keyed macOS JVM options, `key=value` pairs separated by commas
    #[arg(long = "jvm-default-option", value_name = "MAP", allow_hyphen_values = true)]
    pub jvm_default_options: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,
}

fn parse_target(value: &str) -> Result<Target, String> {
    value.parse().map_err(|e: crate::bundler::Error| e.to_string())
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.config.as_os_str().is_empty() {
            return Err("Configuration path cannot be empty".to_string());
        }
        if let Some(dir) = &self.output_dir
            && dir.is_file()
        {
            return Err(format!("Output directory {} is a file", dir.display()));
        }
        self.extra_jvm_options()?;
        self.extra_jvm_default_options()?;
        Ok(())
    }

    /// `--jvm-option` values, split.
    pub fn extra_jvm_options(&self) -> Result<Vec<String>, String> {
        let mut options = Vec::new();
        for list in &self.jvm_options {
            let parts = split_list(list).map_err(|e| e.to_string())?;
            options.extend(parts.into_iter().filter(|p| !p.is_empty()));
        }
        Ok(options)
    }

    /// `--jvm-default-option` values, split.
    pub fn extra_jvm_default_options(&self) -> Result<BTreeMap<String, String>, String> {
        let mut options = BTreeMap::new();
        for map in &self.jvm_default_options {
            options.extend(split_map(map).map_err(|e| e.to_string())?);
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_are_repeatable() {
        let args = Args::try_parse_from([
            "jvm_bundler",
            "--target",
            "linux64",
            "-t",
            "windows-installer",
        ])
        .unwrap();
        assert_eq!(args.targets, vec![Target::Linux64, Target::WindowsInstaller]);
        assert_eq!(args.config, PathBuf::from("bundle.toml"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn unknown_targets_are_rejected_by_the_parser() {
        assert!(Args::try_parse_from(["jvm_bundler", "--target", "beos"]).is_err());
    }

    #[test]
    fn jvm_options_split_on_unescaped_commas() {
        let args = Args::try_parse_from([
            "jvm_bundler",
            "--jvm-option",
            r"-Xss4m,-Dfoo=a\,b",
            "--jvm-default-option",
            "-Dapple.awt.application.name=Foo",
        ])
        .unwrap();
        assert_eq!(
            args.extra_jvm_options().unwrap(),
            vec!["-Xss4m".to_string(), "-Dfoo=a,b".to_string()]
        );
        assert_eq!(
            args.extra_jvm_default_options()
                .unwrap()
                .get("-Dapple.awt.application.name")
                .map(String::as_str),
            Some("Foo")
        );
    }

    #[test]
    fn dangling_escape_fails_validation() {
        let args = Args::try_parse_from(["jvm_bundler", "--jvm-option", "-Xss4m\\"]).unwrap();
        assert!(args.validate().is_err());
    }
}
