//! Native-library classification.
//!
//! Scans a set of inputs, opening jar/zip containers and looking at loose
//! files, and keeps every shared library whose file name matches the target
//! platform's naming convention. Results are flattened to the base file
//! name and marked executable.
//!
//! Two different files with the same base name are reported as
//! [`Error::NativeCollision`]; byte-identical duplicates collapse into one
//! entry.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    fileset::{FileEntry, FileSet, MODE_EXECUTABLE, Provenance},
};
use regex::Regex;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

/// Shared-library naming convention of a platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NativePattern {
    /// `name.so` or `name.so.N`
    Linux,
    /// `name.dylib` or `name.jnilib`
    MacOs,
    /// `name.dll`
    Windows,
}

impl NativePattern {
    fn expression(&self) -> &'static str {
        match self {
            NativePattern::Linux => r"^.+\.so(\.[0-9]+)?$",
            NativePattern::MacOs => r"^.+\.(dylib|jnilib)$",
            NativePattern::Windows => r"(?i)^.+\.dll$",
        }
    }

    /// Compiled matcher for base file names.
    pub fn regex(&self) -> Result<Regex> {
        Ok(Regex::new(self.expression())?)
    }
}

/// Classifies `inputs` on a blocking thread.
pub async fn classify(inputs: Vec<PathBuf>, pattern: NativePattern) -> Result<FileSet> {
    tokio::task::spawn_blocking(move || classify_blocking(&inputs, pattern))
        .await
        .map_err(|e| Error::GenericError(format!("Native classification task panicked: {}", e)))?
}

/// Classifies `inputs`, returning matching libraries keyed by base name.
///
/// Inputs that are zip containers are scanned entry by entry; other files
/// are candidates themselves. Zero matches is a valid, empty result.
pub fn classify_blocking(inputs: &[PathBuf], pattern: NativePattern) -> Result<FileSet> {
    let matcher = pattern.regex()?;
    let mut found = FileSet::new();

    for input in inputs {
        if is_zip_container(input)? {
            let file = File::open(input).fs_context("opening native archive", input)?;
            let mut archive = zip::ZipArchive::new(file)?;
            for i in 0..archive.len() {
                let entry = archive.by_index(i)?;
                if entry.is_dir() {
                    continue;
                }
                let entry_name = entry.name().to_string();
                let base = base_name(&entry_name);
                if !matcher.is_match(base) {
                    continue;
                }
                log::debug!("native {} found in {}", base, input.display());
                add(
                    &mut found,
                    base.to_string(),
                    Provenance::ArchiveMember {
                        archive: input.clone(),
                        entry: entry_name,
                    },
                )?;
            }
        } else if let Some(name) = input.file_name().and_then(|n| n.to_str())
            && matcher.is_match(name)
        {
            log::debug!("native {} found as loose file", name);
            add(&mut found, name.to_string(), Provenance::Loose(input.clone()))?;
        }
    }

    Ok(found)
}

fn add(found: &mut FileSet, name: String, provenance: Provenance) -> Result<()> {
    let Some(existing) = found.get(&name) else {
        found.insert(
            name,
            FileEntry {
                provenance,
                mode: MODE_EXECUTABLE,
            },
        );
        return Ok(());
    };

    if existing.provenance == provenance {
        return Ok(());
    }

    let (first, second) = if existing.provenance < provenance {
        (existing.provenance.clone(), provenance)
    } else {
        (provenance, existing.provenance.clone())
    };

    if first.digest()? != second.digest()? {
        return Err(Error::NativeCollision {
            name,
            first: first.to_string(),
            second: second.to_string(),
        });
    }

    log::debug!("identical copies of {} in {} and {}", name, first, second);
    found.insert(
        name,
        FileEntry {
            provenance: first,
            mode: MODE_EXECUTABLE,
        },
    );
    Ok(())
}

fn base_name(entry: &str) -> &str {
    entry.rsplit(['/', '\\']).next().unwrap_or(entry)
}

/// Checks the local-file-header magic instead of trusting the extension.
fn is_zip_container(path: &Path) -> Result<bool> {
    let mut file = File::open(path).fs_context("opening native input", path)?;
    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == *b"PK\x03\x04" || magic == *b"PK\x05\x06"),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e).fs_context("reading native input", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn jar(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.join(name);
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        for (entry, data) in entries {
            zip.start_file(*entry, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    #[test]
    fn patterns_match_platform_conventions() {
        let linux = NativePattern::Linux.regex().unwrap();
        assert!(linux.is_match("liblwjgl.so"));
        assert!(linux.is_match("libopenal.so.1"));
        assert!(!linux.is_match("liblwjgl.so.sha1"));
        assert!(!linux.is_match("liblwjgl.dylib"));

        let mac = NativePattern::MacOs.regex().unwrap();
        assert!(mac.is_match("liblwjgl.dylib"));
        assert!(mac.is_match("libjinput-osx.jnilib"));
        assert!(!mac.is_match("lwjgl.dll"));

        let windows = NativePattern::Windows.regex().unwrap();
        assert!(windows.is_match("lwjgl64.dll"));
        assert!(windows.is_match("OpenAL32.DLL"));
        assert!(!windows.is_match("lwjgl.so"));
    }

    #[test]
    fn archive_members_are_flattened_to_base_name() {
        let dir = TempDir::new().unwrap();
        let natives = jar(
            dir.path(),
            "natives-linux.jar",
            &[
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
                ("linux/x64/org/lwjgl/liblwjgl.so", b"elf"),
                ("linux/x64/org/lwjgl/liblwjgl.so.sha1", b"hash"),
                ("windows/x64/lwjgl.dll", b"pe"),
            ],
        );

        let found = classify_blocking(&[natives.clone()], NativePattern::Linux).unwrap();
        assert_eq!(found.names().collect::<Vec<_>>(), vec!["liblwjgl.so"]);
        let entry = found.get("liblwjgl.so").unwrap();
        assert_eq!(entry.mode, 0o755);
        assert_eq!(
            entry.provenance,
            Provenance::ArchiveMember {
                archive: natives,
                entry: "linux/x64/org/lwjgl/liblwjgl.so".into()
            }
        );
    }

    #[test]
    fn loose_files_are_candidates() {
        let dir = TempDir::new().unwrap();
        let lib = dir.path().join("libfoo.so.2");
        std::fs::write(&lib, b"elf").unwrap();
        let readme = dir.path().join("README.txt");
        std::fs::write(&readme, b"text").unwrap();

        let found = classify_blocking(&[lib, readme], NativePattern::Linux).unwrap();
        assert_eq!(found.names().collect::<Vec<_>>(), vec!["libfoo.so.2"]);
    }

    #[test]
    fn classification_is_idempotent_and_order_independent() {
        let dir = TempDir::new().unwrap();
        let a = jar(dir.path(), "a.jar", &[("x/libone.dylib", b"1")]);
        let b = jar(dir.path(), "b.jar", &[("y/libtwo.jnilib", b"2"), ("z/libone.dylib", b"1")]);

        let forward = classify_blocking(&[a.clone(), b.clone()], NativePattern::MacOs).unwrap();
        let again = classify_blocking(&[a.clone(), b.clone()], NativePattern::MacOs).unwrap();
        let reverse = classify_blocking(&[b, a], NativePattern::MacOs).unwrap();
        assert_eq!(forward, again);
        assert_eq!(forward, reverse);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn zero_matches_is_empty() {
        let dir = TempDir::new().unwrap();
        let app = jar(dir.path(), "app.jar", &[("com/example/Main.class", b"\xca\xfe")]);
        let found = classify_blocking(&[app], NativePattern::Windows).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn different_content_with_same_name_is_a_collision() {
        let dir = TempDir::new().unwrap();
        let a = jar(dir.path(), "a.jar", &[("linux/libfoo.so", b"first")]);
        let b = jar(dir.path(), "b.jar", &[("other/libfoo.so", b"second")]);

        let err = classify_blocking(&[a, b], NativePattern::Linux).unwrap_err();
        match err {
            Error::NativeCollision { name, .. } => assert_eq!(name, "libfoo.so"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
