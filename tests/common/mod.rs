#![allow(dead_code)]

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use std::{
    collections::BTreeMap,
    fs,
    io::{Cursor, Read, Write},
    path::{Path, PathBuf},
};

/// A project directory with a `bundle.toml` and its inputs.
pub struct Project {
    pub dir: tempfile::TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn jar(&self, relative: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        let bytes = writer.finish().unwrap().into_inner();
        self.write(relative, &bytes)
    }

    pub fn tar_gz(&self, relative: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        let bytes = builder.into_inner().unwrap().finish().unwrap();
        self.write(relative, &bytes)
    }

    pub fn config(&self, toml: &str) -> PathBuf {
        self.write("bundle.toml", toml.as_bytes())
    }

    pub fn artifact(&self, name: &str) -> PathBuf {
        self.path("build/distributions").join(name)
    }
}

/// Archive member: mode and contents (`None` for directories).
#[derive(Debug)]
pub struct Member {
    pub mode: u32,
    pub data: Option<Vec<u8>>,
}

/// Reads every member of a `.tar.gz`, keyed by path.
pub fn read_tar_gz(path: &Path) -> BTreeMap<String, Member> {
    let mut archive = tar::Archive::new(GzDecoder::new(fs::File::open(path).unwrap()));
    let mut members = BTreeMap::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let name = entry.path().unwrap().to_string_lossy().into_owned();
        let mode = entry.header().mode().unwrap();
        let data = if entry.header().entry_type().is_dir() {
            None
        } else {
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            Some(data)
        };
        members.insert(name, Member { mode, data });
    }
    members
}

/// First path components of the members, deduplicated.
pub fn top_level(members: &BTreeMap<String, Member>) -> Vec<String> {
    let mut roots: Vec<String> = members
        .keys()
        .map(|name| name.split('/').next().unwrap_or_default().to_string())
        .collect();
    roots.dedup();
    roots
}

pub const APPLICATION: &str = r#"
[application]
name = "Foo"
full_name = "Foo Game"
version = "1.0"
company = "Example"
main_class = "com.example.Main"
"#;
