//! Main bundler orchestration and coordination.
//!
//! This module provides the [`Bundler`] orchestrator that runs every
//! requested target concurrently and sorts the outcomes into a
//! [`BundleReport`].

use crate::bundler::{
    Result, Settings,
    error::{Error, ErrorExt},
    platform::{Runtimes, Target, compose},
    runtime::{Downloader, HttpDownloader, RuntimeFetcher, RuntimeRelease},
    settings::RuntimeSlot,
};
use serde::Serialize;
use std::{collections::BTreeMap, path::PathBuf, sync::Arc};
use tokio::task::JoinSet;

use super::checksum::calculate_sha256;

/// A package written to the output directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BundledArtifact {
    /// Target the package was built for.
    pub target: Target,
    /// Artifact path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// SHA-256 (hex).
    pub checksum: String,
}

/// A target that produced no package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    /// Target.
    pub target: Target,
    /// Why it produced nothing.
    pub reason: String,
}

/// Outcome of a packaging run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BundleReport {
    /// Packages written, in target order.
    pub artifacts: Vec<BundledArtifact>,
    /// Targets that cannot be built in this environment.
    pub skipped: Vec<TargetOutcome>,
    /// Targets whose packaging failed.
    pub failed: Vec<TargetOutcome>,
}

impl BundleReport {
    /// Whether every target either produced a package or was skipped.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Main bundler orchestrator.
///
/// Runs one task per target. Targets share the runtime cache and the
/// runtime images fetched during the run; nothing else.
///
/// # Degradation
///
/// - skippable errors (runtime unavailable, missing resource or tool) are
///   logged and recorded as skipped
/// - other errors fail only their own target
/// - configuration errors abort the run
///
/// With a single requested target, a skip or failure is returned as the
/// error itself.
///
/// # Examples
///
/// ```no_run
/// use jvm_bundler::bundler::{Bundler, Settings};
///
/// # async fn example(settings: Settings) -> jvm_bundler::bundler::Result<()> {
/// let report = Bundler::new(settings).bundle().await?;
/// for artifact in &report.artifacts {
///     println!("{} ({} bytes) {}", artifact.path.display(), artifact.size, artifact.checksum);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Bundler {
    settings: Arc<Settings>,
    fetcher: Arc<RuntimeFetcher>,
}

impl std::fmt::Debug for Bundler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundler")
            .field("settings", &self.settings)
            .field("cache", &self.fetcher.cache_root())
            .finish()
    }
}

impl Bundler {
    /// Creates a bundler that downloads runtimes over HTTP.
    pub fn new(settings: Settings) -> Self {
        Self::with_downloader(settings, Arc::new(HttpDownloader::new()))
    }

    /// Creates a bundler with a custom runtime downloader.
    pub fn with_downloader(settings: Settings, downloader: Arc<dyn Downloader>) -> Self {
        let fetcher = Arc::new(RuntimeFetcher::new(settings.cache_directory(), downloader));
        Self {
            settings: Arc::new(settings),
            fetcher,
        }
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Builds every configured target.
    pub async fn bundle(&self) -> Result<BundleReport> {
        let targets = self.settings.targets().to_vec();
        let runtimes = Runtimes::new(self.fetcher.clone(), self.resolve_releases(&targets)?);

        let mut tasks = JoinSet::new();
        for target in targets.iter().copied() {
            let settings = self.settings.clone();
            let runtimes = runtimes.clone();
            tasks.spawn(async move { (target, compose(settings, target, runtimes).await) });
        }

        let mut outcomes: BTreeMap<Target, Result<PathBuf>> = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (target, result) = joined
                .map_err(|e| Error::GenericError(format!("Target task panicked: {}", e)))?;
            match result {
                Err(e) if e.is_fatal() => {
                    log::error!("{}: {}", target, e);
                    tasks.abort_all();
                    return Err(e);
                }
                result => {
                    outcomes.insert(target, result);
                }
            }
        }

        let single = targets.len() == 1;
        let mut report = BundleReport::default();
        for (target, result) in outcomes {
            match result {
                Ok(path) => report.artifacts.push(artifact(target, path).await?),
                Err(e) if single => return Err(e),
                Err(e) if e.is_skippable() => {
                    log::warn!("Skipping {}: {}", target, e);
                    report.skipped.push(TargetOutcome {
                        target,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    log::error!("{} failed: {}", target, e);
                    report.failed.push(TargetOutcome {
                        target,
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "{} packaged, {} skipped, {} failed",
            report.artifacts.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Resolves the release of every runtime slot the targets need.
    ///
    /// Source errors are configuration errors, reported before any work.
    fn resolve_releases(&self, targets: &[Target]) -> Result<BTreeMap<RuntimeSlot, RuntimeRelease>> {
        let pins = &self.settings.application().runtimes;
        let mut releases = BTreeMap::new();
        for slot in targets.iter().flat_map(|t| t.runtime_slots()) {
            if !releases.contains_key(slot) {
                let release = RuntimeRelease::resolve(*slot, pins.get(*slot))?;
                log::debug!("{} runtime: {} from {}", slot, release.release_id, release.url);
                releases.insert(*slot, release);
            }
        }
        Ok(releases)
    }
}

async fn artifact(target: Target, path: PathBuf) -> Result<BundledArtifact> {
    let size = tokio::fs::metadata(&path)
        .await
        .fs_context("reading artifact metadata", &path)?
        .len();
    let checksum = calculate_sha256(&path).await?;
    log::info!("Created {} ({} bytes)", path.display(), size);
    Ok(BundledArtifact {
        target,
        path,
        size,
        checksum,
    })
}
