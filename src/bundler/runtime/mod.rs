//! Java runtime fetching, caching and pruning.
//!
//! A runtime moves through `NotCached → Downloading → Downloaded →
//! Unpacking → Ready` per `(slot, release)` cache key. [`RuntimeFetcher`]
//! drives those steps; [`prune`] narrows the resulting [`RuntimeImage`] with
//! a platform [`DenyList`].

mod fetch;
mod image;
mod prune;
mod source;
mod unpack;

pub use crate::bundler::utils::http::{Downloader, HttpDownloader};
pub use fetch::RuntimeFetcher;
pub use image::RuntimeImage;
pub use prune::{DenyList, DenyRule, PruneProfile, prune};
pub use source::{ArchiveFormat, RuntimeRelease};
