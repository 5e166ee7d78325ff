//! Linux tarballs: the install tree relative to `/`, run by the system `java`.

use super::{ArchDestination, DestinationMap, Target};
use crate::bundler::{
    error::Result,
    fileset::MODE_EXECUTABLE,
    launcher::PosixLauncher,
    layout::{PackageLayout, join},
    settings::Settings,
};

pub(super) fn destinations(target: Target, settings: &Settings) -> DestinationMap {
    let linux = &settings.bundle_settings().linux;
    let lib = relative(&linux.lib_path(&settings.application().exec_name()));
    DestinationMap {
        jars: lib.clone(),
        launchers: relative(&linux.bin_path()),
        arches: vec![ArchDestination {
            inputs: target,
            slot: None,
            jars: lib.clone(),
            natives: lib,
            runtime: String::new(),
        }],
    }
}

pub(super) fn add_launcher(
    layout: &mut PackageLayout,
    settings: &Settings,
    destinations: &DestinationMap,
) -> Result<()> {
    let launcher = PosixLauncher::from_settings(settings);
    let script = launcher.generate()?;
    layout.insert_generated(
        &join(&destinations.launchers, &launcher.exec_name),
        script,
        MODE_EXECUTABLE,
    )
}

fn relative(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}
