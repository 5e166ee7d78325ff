//! Deterministic archive writers for package layouts.
//!
//! Entries are written in path order with every implied parent directory,
//! a fixed timestamp, zero owner ids and the layout's permission bits, so
//! the same layout always produces the same bytes. The archive is written
//! next to its destination and renamed into place once complete.

mod tar_gz;
mod zip;

pub use self::tar_gz::write_tar_gz;
pub use self::zip::write_zip;

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    layout::{LayoutEntry, PackageLayout},
};
use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Permission bits of directory entries.
pub const MODE_DIRECTORY: u32 = 0o755;

/// Archive container of a finished package.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ArchiveKind {
    /// gzip-compressed tarball
    TarGz,
    /// zip
    Zip,
}

/// Writes `layout` to `dest` on a blocking thread.
pub async fn write_archive(kind: ArchiveKind, layout: PackageLayout, dest: PathBuf) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating output directory", parent)?;
    }
    tokio::task::spawn_blocking(move || {
        let partial = partial_path(&dest);
        let result = match kind {
            ArchiveKind::TarGz => write_tar_gz(&layout, &partial),
            ArchiveKind::Zip => write_zip(&layout, &partial),
        }
        .and_then(|()| std::fs::rename(&partial, &dest).fs_context("moving archive into place", &dest));
        if result.is_err()
            && let Err(e) = std::fs::remove_file(&partial)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            log::warn!("could not remove partial archive {}: {}", partial.display(), e);
        }
        result
    })
    .await
    .map_err(|e| Error::GenericError(format!("Archive task panicked: {}", e)))?
}

/// Path order with directories interleaved before their contents.
enum Item<'a> {
    Directory,
    File(&'a LayoutEntry),
}

fn ordered_items(layout: &PackageLayout) -> BTreeMap<String, Item<'_>> {
    let mut items: BTreeMap<String, Item<'_>> = layout
        .directories()
        .into_iter()
        .map(|dir| (dir, Item::Directory))
        .collect();
    for (path, entry) in layout.iter() {
        items.insert(path.to_string(), Item::File(entry));
    }
    items
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut partial = OsString::from(dest.as_os_str());
    partial.push(".part");
    PathBuf::from(partial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::fileset::MODE_REGULAR;

    #[tokio::test]
    async fn failed_write_leaves_no_partial_archive() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Foo-Linux64.tar.gz");
        let mut layout = PackageLayout::new();
        layout
            .insert_file("usr/share/java/foo/foo.jar", dir.path().join("missing.jar"), MODE_REGULAR)
            .unwrap();

        let err = write_archive(ArchiveKind::TarGz, layout, dest.clone())
            .await
            .unwrap_err();
        assert!(!err.is_fatal());
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }
}
