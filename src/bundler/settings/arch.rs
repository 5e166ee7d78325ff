//! CPU architecture types and utilities.

use std::fmt;

/// CPU architecture of a packaged runtime.
///
/// Only the two x86 flavours are packaged: the bundled JRE distributions
/// are published for these and nothing else.
///
/// # Examples
///
/// ```no_run
/// use jvm_bundler::bundler::Arch;
///
/// assert_eq!(Arch::X86_64.bits(), 64);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// x86 / i686 (32-bit)
    X86,
    /// x86_64 / AMD64 (64-bit)
    X86_64,
}

impl Arch {
    /// Pointer width, used in artifact names (`Linux32`, `Windows64`).
    pub fn bits(&self) -> u8 {
        match self {
            Arch::X86 => 32,
            Arch::X86_64 => 64,
        }
    }

    /// Architecture tag used by AdoptOpenJDK release names.
    pub fn adoptopenjdk_tag(&self) -> &'static str {
        match self {
            Arch::X86 => "x86-32",
            Arch::X86_64 => "x64",
        }
    }

    /// Architecture tag used by ojdkbuild release names.
    pub fn ojdkbuild_tag(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X86 => write!(f, "x86"),
            Arch::X86_64 => write!(f, "x86_64"),
        }
    }
}
