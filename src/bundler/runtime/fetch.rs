//! Runtime cache population.
//!
//! Each `(slot, release)` pair owns a cache directory:
//!
//! ```text
//! <cache>/<slot>/<release>/jdk.<ext>      downloaded archive
//! <cache>/<slot>/<release>/unpack/        extracted <root>/jre tree
//! ```
//!
//! A step is skipped when its output already exists, so a failed run only
//! repeats the step that failed. Outputs appear through a rename, never
//! half-written. An unpinned archive that fails to unpack right after its
//! download is discarded so the next run fetches it again.

use super::{
    RuntimeImage,
    prune::DenyList,
    source::RuntimeRelease,
    unpack::{self, JRE_DIR},
};
use crate::bundler::{
    builder::checksum,
    error::{Error, ErrorExt, Result},
    settings::RuntimeSlot,
    utils::{fs, http::Downloader},
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

const UNPACK_DIR: &str = "unpack";

type CacheKey = (RuntimeSlot, String);

/// Downloads, caches and unpacks runtime archives.
///
/// At most one populate sequence runs per cache key at a time; different
/// keys proceed concurrently.
pub struct RuntimeFetcher {
    cache_root: PathBuf,
    downloader: Arc<dyn Downloader>,
    locks: Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl RuntimeFetcher {
    /// Fetcher caching under `cache_root`.
    pub fn new(cache_root: impl Into<PathBuf>, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            cache_root: cache_root.into(),
            downloader,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Cache root.
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Cache directory of one release.
    pub fn release_dir(&self, slot: RuntimeSlot, release: &RuntimeRelease) -> PathBuf {
        self.cache_root.join(slot.key()).join(&release.release_id)
    }

    /// Returns the unpacked runtime for `release`, populating the cache as needed.
    ///
    /// # Errors
    ///
    /// * [`Error::Download`] if the transfer does not complete
    /// * [`Error::HashMismatch`] if the archive does not match its pin
    /// * [`Error::Unpack`] if the archive is corrupt or has no matching root
    pub async fn fetch(&self, slot: RuntimeSlot, release: &RuntimeRelease) -> Result<RuntimeImage> {
        let key = (slot, release.release_id.clone());
        let lock = self.lock_for(&key);
        let result = {
            let _guard = lock.lock().await;
            self.populate(slot, release).await
        };
        self.release_lock(&key, lock);
        result
    }

    async fn populate(&self, slot: RuntimeSlot, release: &RuntimeRelease) -> Result<RuntimeImage> {
        let release_dir = self.release_dir(slot, release);
        let archive = release_dir.join(format!("jdk.{}", release.format.extension()));
        let unpack_dir = release_dir.join(UNPACK_DIR);

        if unpack_dir.is_dir() {
            log::debug!("{} runtime {} is cached", slot, release.release_id);
        } else {
            tokio::fs::create_dir_all(&release_dir)
                .await
                .fs_context("creating runtime cache directory", &release_dir)?;
            let downloaded = !archive.is_file();
            if downloaded {
                self.download(release, &archive).await?;
            }
            if let Err(e) = self.unpack(release, &archive, &unpack_dir).await {
                if downloaded && release.sha256.is_none() {
                    log::warn!("discarding downloaded runtime {}", archive.display());
                    if let Err(rm) = fs::remove_file(&archive).await {
                        log::warn!("could not remove {}: {}", archive.display(), rm);
                    }
                }
                return Err(e);
            }
        }

        let home = locate_home(&unpack_dir, &release.root, &archive)?;
        Ok(RuntimeImage::new(home, DenyList::empty()))
    }

    async fn download(&self, release: &RuntimeRelease, archive: &Path) -> Result<()> {
        let partial = partial_path(archive);
        fs::remove_file(&partial).await?;

        log::info!("Fetching runtime {} from {}", release.release_id, release.url);
        let result = async {
            self.downloader.download(&release.url, &partial).await?;
            if let Some(expected) = &release.sha256 {
                checksum::verify_sha256(&partial, expected).await?;
            }
            tokio::fs::rename(&partial, archive)
                .await
                .fs_context("moving downloaded runtime into place", archive)
        }
        .await;

        if result.is_err()
            && let Err(e) = fs::remove_file(&partial).await
        {
            log::warn!("could not remove partial download {}: {}", partial.display(), e);
        }
        result
    }

    async fn unpack(&self, release: &RuntimeRelease, archive: &Path, unpack_dir: &Path) -> Result<()> {
        let staging = unpack_dir.with_file_name(format!("{UNPACK_DIR}.tmp"));
        fs::remove_dir_all(&staging).await?;

        log::info!("Unpacking runtime {}", release.release_id);
        let result = async {
            let root = unpack::unpack(archive, release.format, &release.root, &staging).await?;
            log::debug!("runtime {} root is {}", release.release_id, root);
            tokio::fs::rename(&staging, unpack_dir)
                .await
                .fs_context("moving unpacked runtime into place", unpack_dir)
        }
        .await;

        if result.is_err()
            && let Err(e) = fs::remove_dir_all(&staging).await
        {
            log::warn!("could not remove {}: {}", staging.display(), e);
        }
        result
    }

    fn lock_for(&self, key: &CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(key.clone()).or_default().clone()
    }

    /// Drops the key's lock once no other fetch holds it.
    fn release_lock(&self, key: &CacheKey, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        drop(lock);
        if locks.get(key).is_some_and(|held| Arc::strong_count(held) == 1) {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    pub(super) fn lock_count(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

fn partial_path(archive: &Path) -> PathBuf {
    let mut partial = archive.as_os_str().to_owned();
    partial.push(".part");
    PathBuf::from(partial)
}

/// Finds `<unpack>/<root>/jre`, taking the first root in name order.
fn locate_home(unpack_dir: &Path, root: &str, archive: &Path) -> Result<PathBuf> {
    let pattern = glob::Pattern::new(root)?;
    let mut roots = std::fs::read_dir(unpack_dir)
        .fs_context("reading unpacked runtime", unpack_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| pattern.matches(name))
        })
        .map(|entry| entry.path().join(JRE_DIR))
        .filter(|home| home.is_dir())
        .collect::<Vec<_>>();
    roots.sort();

    roots.into_iter().next().ok_or_else(|| Error::Unpack {
        archive: archive.to_path_buf(),
        reason: format!("cached runtime has no {JRE_DIR}/ under a root matching `{root}`"),
    })
}
