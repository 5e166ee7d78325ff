//! macOS `.app` bundles with an embedded runtime.

use super::{ArchDestination, DestinationMap, Target};
use crate::bundler::{
    error::{Error, Result},
    fileset::{FileSet, MODE_EXECUTABLE, MODE_REGULAR},
    layout::{LayoutSource, PackageLayout, join},
    plist::{APP_ICON_FILE, AppPlist, JrePlist, PlistDocument, RUNTIME_BUNDLE, write_pkg_info, write_plist},
    runtime::RuntimeRelease,
    settings::{RuntimeSlot, Settings},
};
use std::path::Path;

/// `en.lproj/Localizable.strings` used when none is configured.
pub const DEFAULT_LOCALIZABLE_STRINGS: &str = "\"JRELoadError\" = \"Unable to load Java Runtime Environment.\";
\"MainClassNameRequired\" = \"Main class name is required.\";
\"JavaDirectoryNotFound\" = \"Unable to enumerate Java directory contents.\";
";

const LIBJLI: &str = "lib/jli/libjli.dylib";

fn contents(settings: &Settings) -> String {
    format!("{}.app/Contents", settings.application().full_name())
}

fn runtime_bundle(contents: &str) -> String {
    join(contents, &format!("PlugIns/{RUNTIME_BUNDLE}/Contents"))
}

pub(super) fn destinations(settings: &Settings) -> DestinationMap {
    let contents = contents(settings);
    let macos = join(&contents, "MacOS");
    DestinationMap {
        jars: join(&contents, "Java"),
        launchers: macos.clone(),
        arches: vec![ArchDestination {
            inputs: Target::MacOs,
            slot: Some(RuntimeSlot::MacOs),
            jars: join(&contents, "Java"),
            natives: macos,
            runtime: join(&runtime_bundle(&contents), "Home"),
        }],
    }
}

/// Fails when the launcher stub or icon is unavailable.
pub(super) fn preflight(settings: &Settings) -> Result<()> {
    let resources = &settings.bundle_settings().resources;
    require("mac_launcher", resources.mac_launcher.as_deref())?;
    require("icns", resources.icns.as_deref())?;
    Ok(())
}

fn require<'a>(name: &str, path: Option<&'a Path>) -> Result<&'a Path> {
    match path {
        Some(path) if path.is_file() => Ok(path),
        Some(path) => Err(Error::ResourceMissing(format!(
            "resources.{name} ({})",
            path.display()
        ))),
        None => Err(Error::ResourceMissing(format!("resources.{name} is not set"))),
    }
}

/// Adds the launcher stub, resources, both plists, `PkgInfo` and the
/// runtime's `libjli.dylib` copy.
pub(super) fn add_bundle_metadata(
    layout: &mut PackageLayout,
    settings: &Settings,
    release: &RuntimeRelease,
    runtime: &FileSet,
) -> Result<()> {
    let app = settings.application();
    let resources = &settings.bundle_settings().resources;
    let contents = contents(settings);
    let jre = runtime_bundle(&contents);

    let launcher = require("mac_launcher", resources.mac_launcher.as_deref())?;
    layout.insert_file(&join(&contents, &format!("MacOS/{}", app.name)), launcher, MODE_EXECUTABLE)?;

    let icns = require("icns", resources.icns.as_deref())?;
    layout.insert_file(&join(&contents, &format!("Resources/{APP_ICON_FILE}")), icns, MODE_REGULAR)?;

    let strings = join(&contents, "Resources/en.lproj/Localizable.strings");
    match &resources.localizable_strings {
        Some(path) => layout.insert_file(&strings, path, MODE_REGULAR)?,
        None => layout.insert_generated(&strings, DEFAULT_LOCALIZABLE_STRINGS, MODE_REGULAR)?,
    }

    layout.insert_generated(
        &join(&contents, "Info.plist"),
        write_plist(&PlistDocument::App(AppPlist::from_settings(settings)))?,
        MODE_REGULAR,
    )?;
    layout.insert_generated(
        &join(&contents, "PkgInfo"),
        write_pkg_info(&settings.bundle_settings().macos.signature),
        MODE_REGULAR,
    )?;

    layout.insert_generated(
        &join(&jre, "Info.plist"),
        write_plist(&PlistDocument::Jre(JrePlist::adoptopenjdk(&release.version)))?,
        MODE_REGULAR,
    )?;
    // Tarballs carry no symlinks here; the bundle loader expects a real file.
    let libjli = runtime
        .get(LIBJLI)
        .ok_or_else(|| Error::ResourceMissing(format!("{LIBJLI} in runtime {}", release.release_id)))?;
    layout.insert(
        &join(&jre, "MacOS/libjli.dylib"),
        LayoutSource::from(libjli.provenance.clone()),
        MODE_EXECUTABLE,
    )?;
    Ok(())
}
