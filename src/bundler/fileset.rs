//! File sets produced by the classifier and the runtime fetcher.

use crate::bundler::error::{ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::{
    collections::BTreeMap,
    fmt,
    io::Read,
    path::{Path, PathBuf},
};

/// Permission bits for regular files in packages.
pub const MODE_REGULAR: u32 = 0o644;
/// Permission bits for executables, native libraries and directories.
pub const MODE_EXECUTABLE: u32 = 0o755;

/// Where a file's bytes come from.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Provenance {
    /// A file on disk.
    Loose(PathBuf),
    /// An entry inside a zip container (jar).
    ArchiveMember {
        /// Archive on disk
        archive: PathBuf,
        /// Entry name inside the archive
        entry: String,
    },
}

impl Provenance {
    /// Reads the full contents.
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            Provenance::Loose(path) => std::fs::read(path).fs_context("reading file", path),
            Provenance::ArchiveMember { archive, entry } => read_archive_member(archive, entry),
        }
    }

    /// SHA-256 of the contents, hex-encoded.
    pub fn digest(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(self.read()?);
        Ok(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Loose(path) => write!(f, "{}", path.display()),
            Provenance::ArchiveMember { archive, entry } => {
                write!(f, "{}!/{}", archive.display(), entry)
            }
        }
    }
}

/// Reads one entry out of a zip container.
pub fn read_archive_member(archive: &Path, entry: &str) -> Result<Vec<u8>> {
    let file = std::fs::File::open(archive).fs_context("opening archive", archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    let mut member = zip.by_name(entry)?;
    let mut bytes = Vec::with_capacity(member.size() as usize);
    member
        .read_to_end(&mut bytes)
        .fs_context("reading archive entry", archive)?;
    Ok(bytes)
}

/// One file in a [`FileSet`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// Content source.
    pub provenance: Provenance,
    /// Permission bits to apply when packaging.
    pub mode: u32,
}

/// Files keyed by relative name.
///
/// Keys are `/`-separated paths relative to the set's root (a bare file
/// name for flattened natives). Iteration order is sorted by key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileSet {
    entries: BTreeMap<String, FileEntry>,
}

impl FileSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the previous one for that name.
    pub fn insert(&mut self, name: impl Into<String>, entry: FileEntry) -> Option<FileEntry> {
        self.entries.insert(name.into(), entry)
    }

    /// Looks up an entry.
    pub fn get(&self, name: &str) -> Option<&FileEntry> {
        self.entries.get(name)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
