use super::{Item, MODE_DIRECTORY, ordered_items};
use crate::bundler::{
    error::{ErrorExt, Result},
    layout::PackageLayout,
};
use std::{fs::File, io::Write, path::Path};
use zip::{CompressionMethod, DateTime, ZipWriter, write::SimpleFileOptions};

fn options(mode: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(mode)
}

/// Writes `layout` as a zip archive at `dest`.
pub fn write_zip(layout: &PackageLayout, dest: &Path) -> Result<()> {
    let file = File::create(dest).fs_context("creating zip file", dest)?;
    let mut zip = ZipWriter::new(file);

    for (path, item) in ordered_items(layout) {
        match item {
            Item::Directory => zip.add_directory(format!("{path}/"), options(MODE_DIRECTORY))?,
            Item::File(entry) => {
                let bytes = entry.source.read()?;
                zip.start_file(path.as_str(), options(entry.mode))?;
                zip.write_all(&bytes).fs_context("writing zip entry", dest)?;
            }
        }
    }

    let mut file = zip.finish()?;
    file.flush().fs_context("flushing zip file", dest)?;
    Ok(())
}
