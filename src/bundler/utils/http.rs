//! Transfer of runtime archives.
//!
//! [`Downloader`] is the seam the runtime fetcher pulls archives through.
//! [`HttpDownloader`] streams `https://` responses to disk chunk by chunk and
//! copies `file://` sources, so locally mirrored runtimes go through the same
//! cache path as upstream ones.

use crate::bundler::error::{Error, ErrorExt, Result};
use futures::future::BoxFuture;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Writes the resource at `url` to `dest`.
///
/// Implementations must report transfer problems as [`Error::Download`] so
/// that targets depending on the resource are skipped rather than failed.
pub trait Downloader: Send + Sync {
    /// Transfers `url` to `dest`, overwriting it.
    fn download<'a>(&'a self, url: &'a Url, dest: &'a Path) -> BoxFuture<'a, Result<()>>;
}

/// [`Downloader`] backed by reqwest.
#[derive(Clone, Debug, Default)]
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    /// Downloader with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch(&self, url: &Url, dest: &Path) -> Result<()> {
        if url.scheme() == "file" {
            let source = url.to_file_path().map_err(|()| download_error(url, "not a local path"))?;
            log::info!("Copying {}", source.display());
            tokio::fs::copy(&source, dest)
                .await
                .map_err(|e| download_error(url, e))?;
            return Ok(());
        }

        log::info!("Downloading {}", url);
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| download_error(url, e))?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .fs_context("creating download file", dest)?;
        let mut received: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|e| download_error(url, e))? {
            file.write_all(&chunk)
                .await
                .fs_context("writing download file", dest)?;
            received += chunk.len() as u64;
        }
        file.flush().await.fs_context("flushing download file", dest)?;

        if let Some(expected) = response.content_length()
            && expected != received
        {
            return Err(download_error(
                url,
                format!("received {received} of {expected} bytes"),
            ));
        }
        log::debug!("Downloaded {} bytes from {}", received, url);
        Ok(())
    }
}

impl Downloader for HttpDownloader {
    fn download<'a>(&'a self, url: &'a Url, dest: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.fetch(url, dest))
    }
}

fn download_error(url: &Url, reason: impl std::fmt::Display) -> Error {
    Error::Download {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
