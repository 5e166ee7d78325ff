//! Executable wrappers: launch4j-built Windows executables and POSIX
//! launcher scripts.

mod launch4j;
mod posix;

pub use launch4j::{
    DEFAULT_MANIFEST, HeaderType, Launch4jConfig, Launch4jConfigBuilder, Launch4jTool,
    VersionInfo,
};
pub use posix::PosixLauncher;
