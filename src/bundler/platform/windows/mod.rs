//! Windows zips and installers.
//!
//! Both ship the launch4j-wrapped `gui` and `console` executables next to a
//! private runtime. The installer stages one tree per architecture and
//! compiles it with Inno Setup.

mod installer;

pub use installer::InnoSetup;

use super::{ArchDestination, DestinationMap, Target};
use crate::bundler::{
    error::{Context, Error, ErrorExt, Result},
    fileset::MODE_EXECUTABLE,
    launcher::{DEFAULT_MANIFEST, HeaderType, Launch4jConfigBuilder, Launch4jTool},
    layout::{PackageLayout, join},
    settings::{RuntimeSlot, Settings},
};
use std::path::{Path, PathBuf};

pub(super) fn zip_destinations(target: Target) -> DestinationMap {
    let slot = match target {
        Target::Windows32 => RuntimeSlot::Windows32,
        _ => RuntimeSlot::Windows64,
    };
    DestinationMap {
        jars: "lib".into(),
        launchers: String::new(),
        arches: vec![ArchDestination {
            inputs: target,
            slot: Some(slot),
            jars: "lib".into(),
            natives: String::new(),
            runtime: "jre".into(),
        }],
    }
}

pub(super) fn installer_destinations() -> DestinationMap {
    let arch = |inputs: Target, slot: RuntimeSlot, bits: u8| ArchDestination {
        inputs,
        slot: Some(slot),
        jars: format!("install/{bits}/lib"),
        natives: format!("install/{bits}"),
        runtime: format!("install/{bits}/jre"),
    };
    DestinationMap {
        jars: "install/common/lib".into(),
        launchers: "install/common".into(),
        arches: vec![
            arch(Target::Windows32, RuntimeSlot::Windows32, 32),
            arch(Target::Windows64, RuntimeSlot::Windows64, 64),
        ],
    }
}

/// Locates launch4j and checks the icon.
pub(super) fn preflight(settings: &Settings) -> Result<Launch4jTool> {
    let resources = &settings.bundle_settings().resources;
    match &resources.ico {
        Some(ico) if ico.is_file() => {}
        Some(ico) => {
            return Err(Error::ResourceMissing(format!(
                "resources.ico ({})",
                ico.display()
            )));
        }
        None => return Err(Error::Configuration("resources.ico is not set".into())),
    }
    Launch4jTool::locate(resources.launch4j.as_deref())
}

/// Wraps the `gui` and `console` executables and adds them at
/// `destinations.launchers`.
pub(super) async fn add_executables(
    layout: &mut PackageLayout,
    settings: &Settings,
    tool: &Launch4jTool,
    scratch: &Path,
    destinations: &DestinationMap,
) -> Result<()> {
    let resources = &settings.bundle_settings().resources;
    let icon = resources
        .ico
        .clone()
        .ok_or_else(|| Error::Configuration("resources.ico is not set".into()))?;
    let manifest = match &resources.windows_manifest {
        Some(path) => path.clone(),
        None => write_default_manifest(scratch).await?,
    };

    for header_type in HeaderType::all() {
        let exe_name = header_type.exe_name(&settings.application().name);
        let config = Launch4jConfigBuilder::from_settings(settings)
            .header_type(header_type)
            .outfile(scratch.join(&exe_name))
            .icon(&icon)
            .manifest(&manifest)
            .build()?;
        let exe = config
            .generate(tool, scratch)
            .await
            .with_context(|| format!("wrapping {exe_name}"))?;
        layout.insert_file(&join(&destinations.launchers, &exe_name), exe, MODE_EXECUTABLE)?;
    }
    Ok(())
}

async fn write_default_manifest(scratch: &Path) -> Result<PathBuf> {
    let path = scratch.join("app.manifest");
    tokio::fs::write(&path, DEFAULT_MANIFEST)
        .await
        .fs_context("writing default manifest", &path)?;
    Ok(path)
}
