//! Per-target package composition.
//!
//! Every target runs the same pipeline, parameterized by a
//! [`PlatformProfile`]:
//!
//! 1. resolve input jars
//! 2. fetch and prune the pinned runtimes
//! 3. classify native libraries
//! 4. generate launch metadata (executables, scripts, plists)
//! 5. merge everything into a [`PackageLayout`]
//! 6. hand the layout to the archiver
//!
//! Targets share nothing but the runtime cache, so they compose concurrently.

mod linux;
mod macos;
mod windows;

pub use macos::DEFAULT_LOCALIZABLE_STRINGS;
pub use windows::InnoSetup;

use crate::bundler::{
    archive::{ArchiveKind, write_archive},
    error::{Context, Error, Result},
    fileset::{FileSet, MODE_REGULAR},
    launcher::Launch4jTool,
    layout::{PackageLayout, join},
    natives::{NativePattern, classify},
    runtime::{PruneProfile, RuntimeFetcher, RuntimeImage, RuntimeRelease, prune},
    settings::{RuntimeSlot, Settings},
    utils::Deferred,
};
use std::{collections::BTreeMap, fmt, path::PathBuf, str::FromStr, sync::Arc};

/// A distributable package.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub enum Target {
    /// 32-bit Linux tarball
    #[serde(rename = "linux32")]
    Linux32,
    /// 64-bit Linux tarball
    #[serde(rename = "linux64")]
    Linux64,
    /// macOS `.app` bundle tarball
    #[serde(rename = "macos")]
    MacOs,
    /// 32-bit Windows zip
    #[serde(rename = "windows32")]
    Windows32,
    /// 64-bit Windows zip
    #[serde(rename = "windows64")]
    Windows64,
    /// Windows installer holding both architectures
    #[serde(rename = "windows-installer")]
    WindowsInstaller,
}

impl Target {
    /// Every target, in build order.
    pub fn all() -> &'static [Target] {
        &[
            Target::Linux32,
            Target::Linux64,
            Target::MacOs,
            Target::Windows32,
            Target::Windows64,
            Target::WindowsInstaller,
        ]
    }

    /// Configuration key.
    pub fn key(&self) -> &'static str {
        match self {
            Target::Linux32 => "linux32",
            Target::Linux64 => "linux64",
            Target::MacOs => "macos",
            Target::Windows32 => "windows32",
            Target::Windows64 => "windows64",
            Target::WindowsInstaller => "windows-installer",
        }
    }

    /// Whether the target ships Windows executables.
    pub fn is_windows(&self) -> bool {
        matches!(
            self,
            Target::Windows32 | Target::Windows64 | Target::WindowsInstaller
        )
    }

    /// Runtimes bundled into the package.
    pub fn runtime_slots(&self) -> &'static [RuntimeSlot] {
        match self {
            Target::Linux32 | Target::Linux64 => &[],
            Target::MacOs => &[RuntimeSlot::MacOs],
            Target::Windows32 => &[RuntimeSlot::Windows32],
            Target::Windows64 => &[RuntimeSlot::Windows64],
            Target::WindowsInstaller => &[RuntimeSlot::Windows32, RuntimeSlot::Windows64],
        }
    }

    /// Output file name, e.g. `Foo-Linux64.tar.gz` or `Foo-Setup-1.0.exe`.
    pub fn artifact_name(&self, name: &str, version: &str) -> String {
        match self {
            Target::Linux32 => format!("{name}-Linux32.tar.gz"),
            Target::Linux64 => format!("{name}-Linux64.tar.gz"),
            Target::MacOs => format!("{name}-MacOSX.tar.gz"),
            Target::Windows32 => format!("{name}-Windows32.zip"),
            Target::Windows64 => format!("{name}-Windows64.zip"),
            Target::WindowsInstaller => format!("{name}-Setup-{version}.exe"),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Target::all()
            .iter()
            .copied()
            .find(|t| t.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "unknown target {s:?}, expected one of: {}",
                    Target::all()
                        .iter()
                        .map(|t| t.key())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

/// How the package's layout becomes a file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Archiver {
    /// gzip-compressed tarball
    TarGz,
    /// zip
    Zip,
    /// Inno Setup compiler run over a staging directory
    InnoSetup,
}

/// Launch metadata generated for the package.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LauncherKind {
    /// POSIX shell script using the system `java`
    PosixScript,
    /// launch4j `gui` and `console` executables
    Launch4j,
    /// Launcher stub plus `Info.plist`/`PkgInfo`
    MacBundle,
}

/// Destinations of one architecture's files.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArchDestination {
    /// Target whose per-target inputs feed this architecture.
    pub inputs: Target,
    /// Bundled runtime.
    pub slot: Option<RuntimeSlot>,
    /// Per-target jars.
    pub jars: String,
    /// Native libraries (flattened).
    pub natives: String,
    /// Runtime home.
    pub runtime: String,
}

/// Fixed destination table of a target.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DestinationMap {
    /// Application jars shared by every architecture.
    pub jars: String,
    /// Generated executables or scripts.
    pub launchers: String,
    /// Architecture-specific files.
    pub arches: Vec<ArchDestination>,
}

/// Everything that distinguishes one target's pipeline from another's.
#[derive(Clone, Debug)]
pub struct PlatformProfile {
    /// Target being built.
    pub target: Target,
    /// Native-library naming convention.
    pub natives: NativePattern,
    /// Runtime deny-list profile.
    pub prune: Option<PruneProfile>,
    /// Destination table.
    pub destinations: DestinationMap,
    /// Launch metadata variant.
    pub launcher: LauncherKind,
    /// Archiver.
    pub archiver: Archiver,
}

impl PlatformProfile {
    /// Profile for `target` under `settings`.
    pub fn for_target(target: Target, settings: &Settings) -> Self {
        match target {
            Target::Linux32 | Target::Linux64 => Self {
                target,
                natives: NativePattern::Linux,
                prune: None,
                destinations: linux::destinations(target, settings),
                launcher: LauncherKind::PosixScript,
                archiver: Archiver::TarGz,
            },
            Target::MacOs => Self {
                target,
                natives: NativePattern::MacOs,
                prune: Some(PruneProfile::MacOs),
                destinations: macos::destinations(settings),
                launcher: LauncherKind::MacBundle,
                archiver: Archiver::TarGz,
            },
            Target::Windows32 | Target::Windows64 => Self {
                target,
                natives: NativePattern::Windows,
                prune: Some(PruneProfile::Windows),
                destinations: windows::zip_destinations(target),
                launcher: LauncherKind::Launch4j,
                archiver: Archiver::Zip,
            },
            Target::WindowsInstaller => Self {
                target,
                natives: NativePattern::Windows,
                prune: Some(PruneProfile::Windows),
                destinations: windows::installer_destinations(),
                launcher: LauncherKind::Launch4j,
                archiver: Archiver::InnoSetup,
            },
        }
    }
}

struct Supply {
    release: RuntimeRelease,
    image: Deferred<RuntimeImage>,
}

/// Runtime images shared by every target of a run.
///
/// Each slot is fetched at most once, on first use, however many targets
/// ask for it.
#[derive(Clone, Default)]
pub struct Runtimes {
    slots: Arc<BTreeMap<RuntimeSlot, Supply>>,
}

impl Runtimes {
    /// Lazily fetched runtimes for `releases`.
    pub fn new(fetcher: Arc<RuntimeFetcher>, releases: BTreeMap<RuntimeSlot, RuntimeRelease>) -> Self {
        let slots = releases
            .into_iter()
            .map(|(slot, release)| {
                let fetcher = fetcher.clone();
                let pinned = release.clone();
                let image = Deferred::new(move || {
                    let fetcher = fetcher.clone();
                    let release = pinned.clone();
                    async move { fetcher.fetch(slot, &release).await }
                });
                (slot, Supply { release, image })
            })
            .collect();
        Self {
            slots: Arc::new(slots),
        }
    }

    fn supply(&self, slot: RuntimeSlot) -> Result<&Supply> {
        self.slots
            .get(&slot)
            .ok_or_else(|| Error::GenericError(format!("no runtime release resolved for {slot}")))
    }

    /// Release pinned for `slot`.
    pub fn release(&self, slot: RuntimeSlot) -> Result<&RuntimeRelease> {
        Ok(&self.supply(slot)?.release)
    }

    /// Unpacked, unpruned image for `slot`.
    pub async fn image(&self, slot: RuntimeSlot) -> Result<RuntimeImage> {
        self.supply(slot)?.image.resolve().await
    }
}

impl fmt::Debug for Runtimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|(slot, s)| (slot, &s.release.release_id)))
            .finish()
    }
}

/// Tools and resources checked before any work starts.
struct Preflight {
    launch4j: Option<Launch4jTool>,
    inno: Option<InnoSetup>,
}

impl Preflight {
    fn check(profile: &PlatformProfile, settings: &Settings) -> Result<Self> {
        let launch4j = match profile.launcher {
            LauncherKind::Launch4j => Some(windows::preflight(settings)?),
            LauncherKind::MacBundle => {
                macos::preflight(settings)?;
                None
            }
            LauncherKind::PosixScript => None,
        };
        let inno = match profile.archiver {
            Archiver::InnoSetup => Some(InnoSetup::locate(settings)?),
            Archiver::TarGz | Archiver::Zip => None,
        };
        Ok(Self { launch4j, inno })
    }
}

/// Builds `target` and returns the artifact path.
///
/// A failed step leaves no artifact behind; the layout is only archived
/// once every source has been merged.
pub async fn compose(settings: Arc<Settings>, target: Target, runtimes: Runtimes) -> Result<PathBuf> {
    let profile = PlatformProfile::for_target(target, &settings);
    let tools = Preflight::check(&profile, &settings)?;
    let inputs = &settings.bundle_settings().inputs;
    let destinations = &profile.destinations;
    let mut layout = PackageLayout::new();

    log::info!("Composing {}", target);
    let mut jars = inputs.jars.clone();
    jars.extend(inputs.target_jars(target));
    insert_jars(&mut layout, &destinations.jars, &jars)?;

    let mut runtime_files: BTreeMap<RuntimeSlot, FileSet> = BTreeMap::new();
    for arch in &destinations.arches {
        if arch.inputs != target {
            insert_jars(&mut layout, &arch.jars, &inputs.target_jars(arch.inputs))?;
        }

        let natives = classify(inputs.natives_for(arch.inputs), profile.natives);
        let (natives, files) = match arch.slot {
            Some(slot) => {
                let (natives, files) =
                    tokio::try_join!(natives, runtime_files_for(&runtimes, slot, profile.prune))?;
                (natives, Some(files))
            }
            None => (natives.await?, None),
        };

        log::debug!("{}: {} native libraries", arch.inputs, natives.len());
        layout.insert_fileset(&arch.natives, &natives)?;
        if let (Some(slot), Some(files)) = (arch.slot, files) {
            log::debug!("{}: {} runtime files", slot, files.len());
            layout.insert_fileset(&arch.runtime, &files)?;
            runtime_files.insert(slot, files);
        }
    }

    // Scratch space for generated executables; dropped after archiving.
    let scratch = tempfile::Builder::new()
        .prefix("jvm_bundler-")
        .tempdir()?;
    match profile.launcher {
        LauncherKind::PosixScript => linux::add_launcher(&mut layout, &settings, destinations)?,
        LauncherKind::MacBundle => {
            let slot = RuntimeSlot::MacOs;
            let files = runtime_files.get(&slot).cloned().unwrap_or_default();
            macos::add_bundle_metadata(
                &mut layout,
                &settings,
                runtimes.release(slot)?,
                &files,
            )?;
        }
        LauncherKind::Launch4j => {
            let tool = tools
                .launch4j
                .as_ref()
                .ok_or_else(|| Error::ToolUnavailable("launch4j".into()))?;
            windows::add_executables(&mut layout, &settings, tool, scratch.path(), destinations)
                .await?;
        }
    }

    let dest = settings.artifact_path(target);
    log::info!("{}: {} files, writing {}", target, layout.len(), dest.display());
    match profile.archiver {
        Archiver::TarGz => write_archive(ArchiveKind::TarGz, layout, dest.clone()).await?,
        Archiver::Zip => write_archive(ArchiveKind::Zip, layout, dest.clone()).await?,
        Archiver::InnoSetup => {
            let inno = tools
                .inno
                .ok_or_else(|| Error::ToolUnavailable("Inno Setup compiler".into()))?;
            inno.compile(layout, &settings, &dest).await?;
        }
    }
    Ok(dest)
}

fn insert_jars(layout: &mut PackageLayout, prefix: &str, jars: &[PathBuf]) -> Result<()> {
    for jar in jars {
        if !jar.is_file() {
            return Err(Error::ResourceMissing(format!("jar {}", jar.display())));
        }
        let Some(name) = jar.file_name() else {
            continue;
        };
        layout.insert_file(&join(prefix, &name.to_string_lossy()), jar, MODE_REGULAR)?;
    }
    Ok(())
}

async fn runtime_files_for(
    runtimes: &Runtimes,
    slot: RuntimeSlot,
    profile: Option<PruneProfile>,
) -> Result<FileSet> {
    let image = runtimes
        .image(slot)
        .await
        .with_context(|| format!("fetching {slot} runtime"))?;
    let image = match profile {
        Some(profile) => prune(&image, profile)?,
        None => image,
    };
    tokio::task::spawn_blocking(move || image.files())
        .await
        .map_err(|e| Error::GenericError(format!("Runtime scan task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_follow_the_platform_table() {
        let names: Vec<String> = Target::all()
            .iter()
            .map(|t| t.artifact_name("Foo", "1.2.3"))
            .collect();
        assert_eq!(
            names,
            vec![
                "Foo-Linux32.tar.gz",
                "Foo-Linux64.tar.gz",
                "Foo-MacOSX.tar.gz",
                "Foo-Windows32.zip",
                "Foo-Windows64.zip",
                "Foo-Setup-1.2.3.exe",
            ]
        );
    }

    #[tokio::test]
    async fn runtime_failures_name_the_slot_and_stay_skippable() {
        struct Offline;

        impl crate::bundler::runtime::Downloader for Offline {
            fn download<'a>(
                &'a self,
                url: &'a url::Url,
                _dest: &'a std::path::Path,
            ) -> futures::future::BoxFuture<'a, Result<()>> {
                Box::pin(async move {
                    Err(Error::Download {
                        url: url.to_string(),
                        reason: "network unreachable".into(),
                    })
                })
            }
        }

        let cache = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(RuntimeFetcher::new(cache.path(), Arc::new(Offline)));
        let release = RuntimeRelease {
            release_id: "OpenJDK8_x64_Mac_jdk8u144-b01".into(),
            url: url::Url::parse("https://example.invalid/jdk").unwrap(),
            format: crate::bundler::runtime::ArchiveFormat::TarGz,
            root: "j2sdk-image".into(),
            version: "jdk8u144-b01".into(),
            sha256: None,
        };
        let runtimes = Runtimes::new(fetcher, BTreeMap::from([(RuntimeSlot::MacOs, release)]));

        let err = runtime_files_for(&runtimes, RuntimeSlot::MacOs, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Context(..)));
        assert!(err.is_skippable());
        assert!(err.to_string().starts_with("fetching macos runtime: "));
        assert!(err.to_string().contains("network unreachable"));
    }

    #[test]
    fn targets_parse_from_their_keys() {
        for target in Target::all() {
            assert_eq!(target.key().parse::<Target>().unwrap(), *target);
        }
        assert_eq!("MacOS".parse::<Target>().unwrap(), Target::MacOs);
        assert!("solaris".parse::<Target>().unwrap_err().is_fatal());
    }

    #[test]
    fn installer_bundles_both_windows_runtimes() {
        assert_eq!(
            Target::WindowsInstaller.runtime_slots(),
            &[RuntimeSlot::Windows32, RuntimeSlot::Windows64]
        );
        assert!(Target::Linux64.runtime_slots().is_empty());
    }

    #[test]
    fn profile_slots_match_target_slots() {
        let settings = crate::bundler::SettingsBuilder::new()
            .application(crate::bundler::ApplicationConfig {
                name: "Foo".into(),
                version: "1.0".into(),
                main_class: "com.example.Main".into(),
                ..Default::default()
            })
            .output_directory("/tmp/out")
            .targets(vec![Target::Linux64])
            .build()
            .unwrap();
        for target in Target::all() {
            let profile = PlatformProfile::for_target(*target, &settings);
            let slots: Vec<RuntimeSlot> = profile
                .destinations
                .arches
                .iter()
                .filter_map(|a| a.slot)
                .collect();
            assert_eq!(slots, target.runtime_slots());
        }
    }
}
