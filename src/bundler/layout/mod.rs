//! Destination trees of a package.
//!
//! A [`PackageLayout`] maps `/`-separated destination paths to their
//! content source and permission bits. Two different sources never share a
//! destination: inserting a second source with other bytes is an
//! [`Error::Conflict`], and byte-identical duplicates collapse.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    fileset::{FileSet, MODE_REGULAR, Provenance, read_archive_member},
    utils::fs::write_with_mode,
};
use sha2::{Digest, Sha256};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};
use walkdir::WalkDir;

/// Where a layout entry's bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutSource {
    /// A file on disk.
    File(PathBuf),
    /// An entry inside a zip container.
    ArchiveMember {
        /// Archive on disk
        archive: PathBuf,
        /// Entry name
        entry: String,
    },
    /// Bytes produced by a generator (plists, scripts, PkgInfo).
    Generated(Arc<[u8]>),
}

impl LayoutSource {
    /// Generated content.
    pub fn generated(bytes: impl Into<Vec<u8>>) -> Self {
        LayoutSource::Generated(Arc::from(bytes.into()))
    }

    /// Reads the full contents.
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            LayoutSource::File(path) => std::fs::read(path).fs_context("reading layout source", path),
            LayoutSource::ArchiveMember { archive, entry } => read_archive_member(archive, entry),
            LayoutSource::Generated(bytes) => Ok(bytes.to_vec()),
        }
    }

    fn digest(&self) -> Result<Vec<u8>> {
        Ok(Sha256::digest(self.read()?).to_vec())
    }
}

impl From<Provenance> for LayoutSource {
    fn from(provenance: Provenance) -> Self {
        match provenance {
            Provenance::Loose(path) => LayoutSource::File(path),
            Provenance::ArchiveMember { archive, entry } => {
                LayoutSource::ArchiveMember { archive, entry }
            }
        }
    }
}

impl fmt::Display for LayoutSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutSource::File(path) => write!(f, "{}", path.display()),
            LayoutSource::ArchiveMember { archive, entry } => {
                write!(f, "{}!/{}", archive.display(), entry)
            }
            LayoutSource::Generated(bytes) => write!(f, "<generated, {} bytes>", bytes.len()),
        }
    }
}

/// One file in a layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutEntry {
    /// Content source.
    pub source: LayoutSource,
    /// Permission bits.
    pub mode: u32,
}

/// Destination tree of one target, sorted by path.
#[derive(Clone, Debug, Default)]
pub struct PackageLayout {
    entries: BTreeMap<String, LayoutEntry>,
}

impl PackageLayout {
    /// Empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `source` at `destination`.
    ///
    /// # Errors
    ///
    /// [`Error::Conflict`] if another source with different content already
    /// occupies `destination`.
    pub fn insert(&mut self, destination: &str, source: LayoutSource, mode: u32) -> Result<()> {
        let destination = normalize(destination)?;
        let Some(existing) = self.entries.get_mut(&destination) else {
            self.entries
                .insert(destination, LayoutEntry { source, mode });
            return Ok(());
        };

        if existing.source != source && existing.source.digest()? != source.digest()? {
            return Err(Error::Conflict {
                destination,
                existing: existing.source.to_string(),
                incoming: source.to_string(),
            });
        }
        log::debug!("{} provided twice with identical content", destination);
        existing.mode = existing.mode.max(mode);
        Ok(())
    }

    /// Adds a file from disk.
    pub fn insert_file(&mut self, destination: &str, path: impl Into<PathBuf>, mode: u32) -> Result<()> {
        self.insert(destination, LayoutSource::File(path.into()), mode)
    }

    /// Adds generated bytes.
    pub fn insert_generated(
        &mut self,
        destination: &str,
        bytes: impl Into<Vec<u8>>,
        mode: u32,
    ) -> Result<()> {
        self.insert(destination, LayoutSource::generated(bytes), mode)
    }

    /// Adds every file of `files` below `prefix`, keeping their modes.
    pub fn insert_fileset(&mut self, prefix: &str, files: &FileSet) -> Result<()> {
        for (name, entry) in files.iter() {
            self.insert(
                &join(prefix, name),
                entry.provenance.clone().into(),
                entry.mode,
            )?;
        }
        Ok(())
    }

    /// Adds every file below `dir` at `prefix`.
    pub fn insert_tree(&mut self, prefix: &str, dir: &Path) -> Result<()> {
        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(dir)?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            self.insert_file(&join(prefix, &relative), entry.path(), MODE_REGULAR)?;
        }
        Ok(())
    }

    /// Looks up a destination.
    pub fn get(&self, destination: &str) -> Option<&LayoutEntry> {
        self.entries.get(destination)
    }

    /// Entries in destination order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LayoutEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the layout has no files.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every directory implied by the file paths, sorted.
    pub fn directories(&self) -> BTreeSet<String> {
        let mut dirs = BTreeSet::new();
        for path in self.entries.keys() {
            let mut end = 0;
            while let Some(pos) = path[end..].find('/') {
                end += pos;
                dirs.insert(path[..end].to_string());
                end += 1;
            }
        }
        dirs
    }

    /// First path components of every entry.
    pub fn top_level(&self) -> BTreeSet<String> {
        self.entries
            .keys()
            .map(|path| path.split('/').next().unwrap_or(path).to_string())
            .collect()
    }

    /// Writes the tree under `dir`.
    ///
    /// Blocking; call from `spawn_blocking`.
    pub fn materialize(&self, dir: &Path) -> Result<()> {
        for (destination, entry) in &self.entries {
            let target = dir.join(destination);
            write_with_mode(&target, &entry.source.read()?, entry.mode)?;
        }
        Ok(())
    }
}

/// Joins a prefix and a relative path with `/`.
pub fn join(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

fn normalize(destination: &str) -> Result<String> {
    let parts: Vec<&str> = destination
        .split(['/', '\\'])
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    if parts.is_empty() || parts.contains(&"..") {
        return Err(Error::GenericError(format!(
            "invalid layout destination: {destination:?}"
        )));
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::fileset::{FileEntry, MODE_EXECUTABLE};

    #[test]
    fn identical_duplicates_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a/libfoo.so");
        let b = dir.path().join("b/libfoo.so");
        for path in [&a, &b] {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"same").unwrap();
        }

        let mut layout = PackageLayout::new();
        layout.insert_file("lib/libfoo.so", &a, MODE_REGULAR).unwrap();
        layout.insert_file("lib/libfoo.so", &b, MODE_EXECUTABLE).unwrap();
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.get("lib/libfoo.so").unwrap().mode, MODE_EXECUTABLE);
    }

    #[test]
    fn different_content_is_a_conflict() {
        let mut layout = PackageLayout::new();
        layout
            .insert_generated("Contents/Info.plist", b"one".to_vec(), MODE_REGULAR)
            .unwrap();
        let err = layout
            .insert_generated("/Contents//Info.plist", b"two".to_vec(), MODE_REGULAR)
            .unwrap_err();
        match err {
            Error::Conflict { destination, .. } => assert_eq!(destination, "Contents/Info.plist"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            layout.get("Contents/Info.plist").unwrap().source.read().unwrap(),
            b"one"
        );
    }

    #[test]
    fn directories_and_top_level_are_derived() {
        let mut files = FileSet::new();
        files.insert(
            "bin/java",
            FileEntry {
                provenance: Provenance::Loose("/jre/bin/java".into()),
                mode: MODE_EXECUTABLE,
            },
        );
        let mut layout = PackageLayout::new();
        layout.insert_fileset("jre", &files).unwrap();
        layout.insert_generated("Foo.exe", b"MZ".to_vec(), MODE_EXECUTABLE).unwrap();

        assert_eq!(
            layout.directories().into_iter().collect::<Vec<_>>(),
            vec!["jre", "jre/bin"]
        );
        assert_eq!(
            layout.top_level().into_iter().collect::<Vec<_>>(),
            vec!["Foo.exe", "jre"]
        );
    }

    #[test]
    fn escaping_destinations_are_rejected() {
        let mut layout = PackageLayout::new();
        assert!(layout.insert_generated("../etc/passwd", b"x".to_vec(), MODE_REGULAR).is_err());
        assert!(layout.insert_generated("/", b"x".to_vec(), MODE_REGULAR).is_err());
    }

    #[test]
    fn materialize_writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut layout = PackageLayout::new();
        layout.insert_generated("Setup.iss", b"[Setup]".to_vec(), MODE_REGULAR).unwrap();
        layout
            .insert_generated("install/common/Foo.exe", b"MZ".to_vec(), MODE_EXECUTABLE)
            .unwrap();
        layout.materialize(dir.path()).unwrap();
        assert_eq!(std::fs::read(dir.path().join("Setup.iss")).unwrap(), b"[Setup]");
        assert!(dir.path().join("install/common/Foo.exe").is_file());
    }
}
