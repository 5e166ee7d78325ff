use super::{Item, MODE_DIRECTORY, ordered_items};
use crate::bundler::{
    error::{ErrorExt, Result},
    layout::PackageLayout,
};
use flate2::{Compression, write::GzEncoder};
use std::{fs::File, io, io::Write, path::Path};

/// Writes `layout` as a gzip-compressed tarball at `dest`.
pub fn write_tar_gz(layout: &PackageLayout, dest: &Path) -> Result<()> {
    let file = File::create(dest).fs_context("creating tar.gz file", dest)?;
    let mut tar = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    for (path, item) in ordered_items(layout) {
        let mut header = tar::Header::new_gnu();
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        match item {
            Item::Directory => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(MODE_DIRECTORY);
                header.set_size(0);
                tar.append_data(&mut header, format!("{path}/"), io::empty())
                    .fs_context("writing tar entry", dest)?;
            }
            Item::File(entry) => {
                let bytes = entry.source.read()?;
                header.set_entry_type(tar::EntryType::Regular);
                header.set_mode(entry.mode);
                header.set_size(bytes.len() as u64);
                tar.append_data(&mut header, &path, bytes.as_slice())
                    .fs_context("writing tar entry", dest)?;
            }
        }
    }

    let encoder = tar.into_inner().fs_context("finishing tar stream", dest)?;
    let mut file = encoder.finish().fs_context("finishing gzip stream", dest)?;
    file.flush().fs_context("flushing tar.gz file", dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::fileset::{MODE_EXECUTABLE, MODE_REGULAR};
    use flate2::read::GzDecoder;

    fn sample() -> PackageLayout {
        let mut layout = PackageLayout::new();
        layout
            .insert_generated("usr/bin/foo", b"#!/bin/bash\n".to_vec(), MODE_EXECUTABLE)
            .unwrap();
        layout
            .insert_generated("usr/share/java/foo/foo.jar", b"PK".to_vec(), MODE_REGULAR)
            .unwrap();
        layout
    }

    #[test]
    fn entries_are_sorted_with_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Foo-Linux64.tar.gz");
        write_tar_gz(&sample(), &dest).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&dest).unwrap()));
        let entries: Vec<(String, u32, u64)> = archive
            .entries()
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                (
                    e.path().unwrap().to_string_lossy().into_owned(),
                    e.header().mode().unwrap(),
                    e.header().mtime().unwrap(),
                )
            })
            .collect();

        let names: Vec<&str> = entries.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "usr/",
                "usr/bin/",
                "usr/bin/foo",
                "usr/share/",
                "usr/share/java/",
                "usr/share/java/foo/",
                "usr/share/java/foo/foo.jar",
            ]
        );
        assert_eq!(entries[2].1, 0o755);
        assert_eq!(entries[6].1, 0o644);
        assert!(entries.iter().all(|(_, _, mtime)| *mtime == 0));
    }

    #[test]
    fn output_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.tar.gz");
        let second = dir.path().join("b.tar.gz");
        write_tar_gz(&sample(), &first).unwrap();
        write_tar_gz(&sample(), &second).unwrap();
        assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
    }
}
