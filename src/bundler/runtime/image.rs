//! Unpacked runtime trees.

use super::DenyList;
use crate::bundler::{
    error::Result,
    fileset::{FileEntry, FileSet, MODE_EXECUTABLE, MODE_REGULAR, Provenance},
};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// An unpacked Java runtime: its home directory plus the paths excluded
/// from packaging.
///
/// The tree on disk is shared through the cache and never modified; pruning
/// only narrows which paths [`RuntimeImage::files`] reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeImage {
    home: PathBuf,
    deny: DenyList,
}

impl RuntimeImage {
    /// Image rooted at `home`.
    pub fn new(home: PathBuf, deny: DenyList) -> Self {
        Self { home, deny }
    }

    /// Runtime home (the unpacked `jre` directory).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Paths excluded so far.
    pub fn deny(&self) -> &DenyList {
        &self.deny
    }

    /// Every file below the home that is not denied, keyed by `/`-separated
    /// relative path.
    ///
    /// Symlinks are followed; dangling ones are dropped.
    pub fn files(&self) -> Result<FileSet> {
        let mut files = FileSet::new();
        for entry in WalkDir::new(&self.home).follow_links(false).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            if entry.file_type().is_symlink() && !entry.path().is_file() {
                log::debug!("skipping dangling or directory link {}", entry.path().display());
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.home)?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if self.deny.is_denied(&relative) {
                continue;
            }

            let mode = file_mode(entry.path(), &relative);
            files.insert(
                relative,
                FileEntry {
                    provenance: Provenance::Loose(entry.path().to_path_buf()),
                    mode,
                },
            );
        }
        Ok(files)
    }
}

#[cfg(unix)]
fn file_mode(path: &Path, _relative: &str) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) if meta.permissions().mode() & 0o111 != 0 => MODE_EXECUTABLE,
        _ => MODE_REGULAR,
    }
}

#[cfg(not(unix))]
fn file_mode(_path: &Path, relative: &str) -> u32 {
    if relative.starts_with("bin/") || relative.ends_with(".dylib") || relative.ends_with(".so") {
        MODE_EXECUTABLE
    } else {
        MODE_REGULAR
    }
}
