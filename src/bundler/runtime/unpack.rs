//! Partial extraction of runtime archives.
//!
//! Only `<root>/jre/**` is written, where `<root>` is the archive's first
//! path component and must match the release's root glob. A leading `./`
//! component is ignored.

use super::source::ArchiveFormat;
use crate::bundler::error::{Error, ErrorExt, Result};
use flate2::read::GzDecoder;
use std::{
    fs::File,
    path::{Component, Path, PathBuf},
};

/// Directory inside the archive root holding the runtime image.
pub(super) const JRE_DIR: &str = "jre";

/// Extracts the runtime image of `archive` into `dest`.
///
/// Returns the matched root component.
pub(super) async fn unpack(
    archive: &Path,
    format: ArchiveFormat,
    root: &str,
    dest: &Path,
) -> Result<String> {
    let pattern = glob::Pattern::new(root)?;
    let root_name = match format {
        ArchiveFormat::TarGz => {
            let archive = archive.to_path_buf();
            let dest = dest.to_path_buf();
            tokio::task::spawn_blocking(move || unpack_tar_gz(&archive, &pattern, &dest))
                .await
                .map_err(|e| Error::GenericError(format!("Unpack task panicked: {}", e)))??
        }
        ArchiveFormat::Zip => unpack_zip(archive, &pattern, dest).await?,
    };

    root_name.ok_or_else(|| Error::Unpack {
        archive: archive.to_path_buf(),
        reason: format!("no {JRE_DIR}/ directory under a root matching `{root}`"),
    })
}

/// Splits an entry path into `(root, path below root/jre)`.
///
/// Returns `None` for entries outside the runtime image, and for anything
/// that would escape the destination.
fn runtime_member(entry: &str, pattern: &glob::Pattern) -> Option<(String, PathBuf)> {
    let normalized = entry.replace('\\', "/");
    let mut parts = Vec::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.len() < 2 || parts[1] != JRE_DIR || !pattern.matches(&parts[0]) {
        return None;
    }
    let root = parts[0].clone();
    let below: PathBuf = parts[2..].iter().collect();
    Some((root, below))
}

fn unpack_tar_gz(archive: &Path, pattern: &glob::Pattern, dest: &Path) -> Result<Option<String>> {
    let unpack_error = |reason: String| Error::Unpack {
        archive: archive.to_path_buf(),
        reason,
    };

    let file = File::open(archive).fs_context("opening runtime archive", archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    let mut root_name: Option<String> = None;

    let entries = tar.entries().map_err(|e| unpack_error(e.to_string()))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| unpack_error(e.to_string()))?;
        let path = entry.path().map_err(|e| unpack_error(e.to_string()))?;
        let Some((root, below)) = runtime_member(&path.to_string_lossy(), pattern) else {
            continue;
        };
        if root_name.as_ref().is_some_and(|r| *r != root) {
            continue;
        }

        let target = dest.join(&root).join(JRE_DIR).join(&below);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).fs_context("creating runtime directory", parent)?;
        }
        entry
            .unpack(&target)
            .map_err(|e| unpack_error(format!("{}: {}", below.display(), e)))?;
        root_name.get_or_insert(root);
    }

    Ok(root_name)
}

async fn unpack_zip(archive: &Path, pattern: &glob::Pattern, dest: &Path) -> Result<Option<String>> {
    use async_zip::base::read::mem::ZipFileReader;
    use futures_lite::io::AsyncReadExt as _;

    let unpack_error = |reason: String| Error::Unpack {
        archive: archive.to_path_buf(),
        reason,
    };

    let data = tokio::fs::read(archive)
        .await
        .fs_context("reading runtime archive", archive)?;
    let reader = ZipFileReader::new(data)
        .await
        .map_err(|e| unpack_error(e.to_string()))?;

    let mut root_name: Option<String> = None;
    for i in 0..reader.file().entries().len() {
        let entry = reader
            .file()
            .entries()
            .get(i)
            .ok_or_else(|| unpack_error(format!("missing entry {}", i)))?;
        let filename = entry
            .filename()
            .as_str()
            .map_err(|e| unpack_error(e.to_string()))?;
        let Some((root, below)) = runtime_member(filename, pattern) else {
            continue;
        };
        if root_name.as_ref().is_some_and(|r| *r != root) {
            continue;
        }

        let target = dest.join(&root).join(JRE_DIR).join(&below);
        let is_dir = entry.dir().map_err(|e| unpack_error(e.to_string()))?;
        if is_dir {
            tokio::fs::create_dir_all(&target)
                .await
                .fs_context("creating runtime directory", &target)?;
        } else {
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .fs_context("creating runtime directory", parent)?;
            }
            let mut entry_reader = reader
                .reader_with_entry(i)
                .await
                .map_err(|e| unpack_error(e.to_string()))?;
            let mut content = Vec::new();
            entry_reader
                .read_to_end(&mut content)
                .await
                .map_err(|e| unpack_error(format!("{}: {}", filename, e)))?;
            tokio::fs::write(&target, content)
                .await
                .fs_context("writing runtime file", &target)?;
        }
        root_name.get_or_insert(root);
    }

    Ok(root_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_outside_jre_are_ignored() {
        let any = glob::Pattern::new("*").unwrap();
        assert_eq!(
            runtime_member("./j2sdk-image/jre/bin/java", &any),
            Some(("j2sdk-image".into(), PathBuf::from("bin/java")))
        );
        assert_eq!(
            runtime_member("jdk\\jre\\bin\\java.exe", &any),
            Some(("jdk".into(), PathBuf::from("bin/java.exe")))
        );
        assert_eq!(runtime_member("j2sdk-image/src.zip", &any), None);
        assert_eq!(runtime_member("j2sdk-image/jre/../../etc/passwd", &any), None);

        let adopt = glob::Pattern::new("j2sdk-image").unwrap();
        assert_eq!(runtime_member("other/jre/bin/java", &adopt), None);
    }
}
