//! Resolution of runtime pins into concrete downloadable releases.

use crate::bundler::{
    error::{Error, Result},
    settings::{RuntimePin, RuntimeSlot, RuntimeSource},
};
use url::Url;

const ADOPTOPENJDK_DOWNLOADS: &str =
    "https://github.com/AdoptOpenJDK/openjdk-releases/releases/download";
const OJDKBUILD_DOWNLOADS: &str = "https://github.com/ojdkbuild/ojdkbuild/releases/download";

/// Container format of a runtime archive.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ArchiveFormat {
    /// gzip-compressed tarball
    TarGz,
    /// zip
    Zip,
}

impl ArchiveFormat {
    /// File extension without leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::Zip => "zip",
        }
    }

    /// Guesses the format from a file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else if lower.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else {
            None
        }
    }
}

/// A concrete runtime archive to fetch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuntimeRelease {
    /// Cache key and upstream file stem.
    pub release_id: String,
    /// Download location (`https://` or `file://`).
    pub url: Url,
    /// Archive container format.
    pub format: ArchiveFormat,
    /// Glob matched against the archive's first path component.
    pub root: String,
    /// Version string reported in the runtime bundle descriptor.
    pub version: String,
    /// Expected SHA-256 of the archive.
    pub sha256: Option<String>,
}

impl RuntimeRelease {
    /// Resolves the release configured for `slot`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when the source cannot serve the slot or a
    /// local archive path is unusable.
    pub fn resolve(slot: RuntimeSlot, pin: &RuntimePin) -> Result<Self> {
        let arch = slot.arch();
        let mut release = match &pin.source {
            RuntimeSource::AdoptOpenJdk { version } => {
                let (platform, format) = if slot.is_macos() {
                    ("Mac", ArchiveFormat::TarGz)
                } else {
                    ("Win", ArchiveFormat::Zip)
                };
                let release_id = format!(
                    "OpenJDK8_{}_{}_{}",
                    arch.adoptopenjdk_tag(),
                    platform,
                    version
                );
                let url = Url::parse(&format!(
                    "{ADOPTOPENJDK_DOWNLOADS}/{version}/{release_id}.{}",
                    format.extension()
                ))?;
                Self {
                    release_id,
                    url,
                    format,
                    root: "j2sdk-image".into(),
                    version: version.clone(),
                    sha256: None,
                }
            }
            RuntimeSource::OjdkBuild { version, build } => {
                if slot.is_macos() {
                    return Err(Error::Configuration(
                        "ojdkbuild only publishes windows runtimes; pick another source for runtime.macos"
                            .into(),
                    ));
                }
                let release_id = format!(
                    "java-1.8.0-openjdk-{build}.ojdkbuild.windows.{}",
                    arch.ojdkbuild_tag()
                );
                let url = Url::parse(&format!(
                    "{OJDKBUILD_DOWNLOADS}/{version}/{release_id}.zip"
                ))?;
                Self {
                    release_id,
                    url,
                    format: ArchiveFormat::Zip,
                    root: "*".into(),
                    version: build.clone(),
                    sha256: None,
                }
            }
            RuntimeSource::Archive {
                path,
                root,
                release,
            } => {
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| {
                        Error::Configuration(format!(
                            "runtime archive path has no file name: {}",
                            path.display()
                        ))
                    })?;
                let format = ArchiveFormat::from_file_name(file_name).ok_or_else(|| {
                    Error::Configuration(format!(
                        "unsupported runtime archive format: {}",
                        path.display()
                    ))
                })?;
                let url = Url::from_file_path(path).map_err(|()| {
                    Error::Configuration(format!(
                        "runtime archive path must be absolute: {}",
                        path.display()
                    ))
                })?;
                let stem = strip_archive_extension(file_name);
                let release_id = release.clone().unwrap_or_else(|| stem.to_string());
                Self {
                    version: release_id.clone(),
                    release_id,
                    url,
                    format,
                    root: root.clone().unwrap_or_else(|| "*".into()),
                    sha256: None,
                }
            }
        };
        release.sha256 = pin.sha256.clone();
        Ok(release)
    }
}

fn strip_archive_extension(name: &str) -> &str {
    [".tar.gz", ".tgz", ".zip"]
        .iter()
        .find_map(|ext| {
            name.len()
                .checked_sub(ext.len())
                .filter(|&cut| name[cut..].eq_ignore_ascii_case(ext))
                .map(|cut| &name[..cut])
        })
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adoptopenjdk_macos_release() {
        let pin = RuntimePin::new(RuntimeSource::AdoptOpenJdk {
            version: "jdk8u144-b01".into(),
        });
        let release = RuntimeRelease::resolve(RuntimeSlot::MacOs, &pin).unwrap();
        assert_eq!(release.release_id, "OpenJDK8_x64_Mac_jdk8u144-b01");
        assert_eq!(
            release.url.as_str(),
            "https://github.com/AdoptOpenJDK/openjdk-releases/releases/download/jdk8u144-b01/OpenJDK8_x64_Mac_jdk8u144-b01.tar.gz"
        );
        assert_eq!(release.format, ArchiveFormat::TarGz);
        assert_eq!(release.root, "j2sdk-image");
    }

    #[test]
    fn ojdkbuild_windows_releases_differ_per_arch() {
        let pin = RuntimePin::new(RuntimeSource::OjdkBuild {
            version: "1.8.0.131-1".into(),
            build: "1.8.0.131-1.b11".into(),
        });
        let x86 = RuntimeRelease::resolve(RuntimeSlot::Windows32, &pin).unwrap();
        let x64 = RuntimeRelease::resolve(RuntimeSlot::Windows64, &pin).unwrap();
        assert_eq!(
            x86.release_id,
            "java-1.8.0-openjdk-1.8.0.131-1.b11.ojdkbuild.windows.x86"
        );
        assert_eq!(
            x64.url.as_str(),
            "https://github.com/ojdkbuild/ojdkbuild/releases/download/1.8.0.131-1/java-1.8.0-openjdk-1.8.0.131-1.b11.ojdkbuild.windows.x86_64.zip"
        );
        assert_eq!(x64.format, ArchiveFormat::Zip);
    }

    #[test]
    fn ojdkbuild_cannot_serve_macos() {
        let pin = RuntimePin::new(RuntimeSource::OjdkBuild {
            version: "1.8.0.131-1".into(),
            build: "1.8.0.131-1.b11".into(),
        });
        let err = RuntimeRelease::resolve(RuntimeSlot::MacOs, &pin).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn local_archive_uses_file_url_and_stem() {
        let mut pin = RuntimePin::new(RuntimeSource::Archive {
            path: "/opt/jre/mac-jre8.tar.gz".into(),
            root: None,
            release: None,
        });
        pin.sha256 = Some("00ff".into());
        let release = RuntimeRelease::resolve(RuntimeSlot::MacOs, &pin).unwrap();
        assert_eq!(release.url.scheme(), "file");
        assert_eq!(release.release_id, "mac-jre8");
        assert_eq!(release.root, "*");
        assert_eq!(release.sha256.as_deref(), Some("00ff"));
    }
}
