// Backend-agnostic filesystem facade
use crate::adapter::{Adapter, ByteStream, FsBackend};
use crate::error::{Error, ParseSettingsSnafu, Result};
use crate::wrap_err;
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tokio::sync::OnceCell;

mod directory;
mod listing;
mod visibility;

pub use listing::{EntryKind, Listing};
pub use visibility::{OperationConfig, VISIBILITY, Visibility};

/// Single-pass, pull-based stream of listing records.
pub type ListingStream = BoxStream<'static, Result<Listing>>;

/// Per-instance facade configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsSettings {
    /// Objects are browsable through public URLs.
    pub has_urls: bool,
    /// Directory keys carry a trailing slash in the backend's key space.
    pub folders_have_trailing_slashes: bool,
}

impl Default for FsSettings {
    fn default() -> Self {
        Self {
            has_urls: false,
            folders_have_trailing_slashes: true,
        }
    }
}

impl FsSettings {
    /// Parse settings from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context(ParseSettingsSnafu)
    }
}

/// Uniform file and directory API over a pluggable storage backend.
///
/// Every adapter failure is reported as one of the normalized [`Error`] kinds
/// with the original cause attached, except file deletions, which are logged
/// and treated as done.
pub struct Filesystem<B: FsBackend> {
    backend: B,
    settings: FsSettings,
    adapter: OnceCell<B::Adapter>,
}

impl<B: FsBackend> Filesystem<B> {
    pub fn new(backend: B, settings: FsSettings) -> Self {
        Self {
            backend,
            settings,
            adapter: OnceCell::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn settings(&self) -> &FsSettings {
        &self.settings
    }

    /// The memoized adapter, built on first use.
    ///
    /// A failed construction is reported as `AdapterInit` and retried on the next call.
    pub async fn adapter(&self) -> Result<&B::Adapter> {
        self.adapter
            .get_or_try_init(|| async {
                self.backend.create_adapter().map_err(|e| Error::AdapterInit {
                    source: Box::new(e),
                })
            })
            .await
    }

    /// Visibility applied to every written object.
    pub fn visibility(&self) -> Visibility {
        if self.settings.has_urls {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }

    fn add_file_metadata(&self, config: &OperationConfig) -> OperationConfig {
        config.with_visibility(self.visibility())
    }

    /// Tell the caching edge that `path` changed. Never fails the caller.
    async fn invalidate_cdn_path(&self, path: &str) {
        if !self.backend.invalidate_cdn_path(path).await {
            log::warn!("CDN invalidation failed for {}", path);
        }
    }

    /// List entries under `directory` as a lazy stream.
    pub async fn list_entries(&self, directory: &str, recursive: bool) -> Result<ListingStream> {
        log::debug!(
            "list_entries directory={} recursive={}",
            directory,
            recursive
        );
        let adapter = self.adapter().await?;
        let entries = wrap_err!(
            adapter.list(directory, recursive).await,
            ListFailed {
                path: directory.to_string()
            }
        )?;

        let path = directory.to_string();
        Ok(entries
            .map(move |entry| {
                entry.map(Listing::from).map_err(|e| Error::ListFailed {
                    path: path.clone(),
                    source: Box::new(e),
                })
            })
            .boxed())
    }

    pub async fn file_size(&self, path: &str) -> Result<u64> {
        log::debug!("file_size path={}", path);
        let adapter = self.adapter().await?;
        wrap_err!(
            adapter.file_size(path).await,
            MetadataUnavailable {
                path: path.to_string(),
                what: "file size"
            }
        )
    }

    pub async fn date_modified(&self, path: &str) -> Result<std::time::SystemTime> {
        log::debug!("date_modified path={}", path);
        let adapter = self.adapter().await?;
        wrap_err!(
            adapter.last_modified(path).await,
            MetadataUnavailable {
                path: path.to_string(),
                what: "date modified"
            }
        )
    }

    pub async fn write(
        &self,
        path: &str,
        contents: impl Into<Vec<u8>>,
        config: &OperationConfig,
    ) -> Result<()> {
        log::debug!("write path={}", path);
        let adapter = self.adapter().await?;
        let config = self.add_file_metadata(config);
        wrap_err!(
            adapter.write(path, contents.into(), &config).await,
            WriteFailed {
                path: path.to_string()
            }
        )
    }

    pub async fn write_stream(
        &self,
        path: &str,
        stream: ByteStream,
        config: &OperationConfig,
    ) -> Result<()> {
        log::debug!("write_stream path={}", path);
        let adapter = self.adapter().await?;
        let config = self.add_file_metadata(config);
        wrap_err!(
            adapter.write_stream(path, stream, &config).await,
            WriteFailed {
                path: path.to_string()
            }
        )
    }

    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        log::debug!("read path={}", path);
        let adapter = self.adapter().await?;
        wrap_err!(
            adapter.read(path).await,
            ReadFailed {
                path: path.to_string()
            }
        )
    }

    /// Open a file as a stream of chunks. Mid-stream failures are `ReadFailed` too.
    pub async fn read_stream(&self, path: &str) -> Result<ByteStream> {
        log::debug!("read_stream path={}", path);
        let adapter = self.adapter().await?;
        let chunks = wrap_err!(
            adapter.read_stream(path).await,
            ReadFailed {
                path: path.to_string()
            }
        )?;

        let path = path.to_string();
        Ok(chunks
            .map(move |chunk| {
                chunk.map_err(|e| Error::ReadFailed {
                    path: path.clone(),
                    source: Box::new(e),
                })
            })
            .boxed())
    }

    pub async fn file_exists(&self, path: &str) -> Result<bool> {
        log::debug!("file_exists path={}", path);
        let adapter = self.adapter().await?;
        wrap_err!(
            adapter.file_exists(path).await,
            ExistenceCheckFailed {
                path: path.to_string()
            }
        )
    }

    /// Delete a file. Backend failures are logged and swallowed: a file that is
    /// already gone counts as deleted.
    pub async fn delete_file(&self, path: &str) -> Result<()> {
        log::debug!("delete_file path={}", path);
        let adapter = self.adapter().await?;
        if let Err(e) = adapter.delete(path).await {
            log::info!("delete of {} reported {}; treating as deleted", path, e);
        }
        self.invalidate_cdn_path(path).await;
        Ok(())
    }

    pub async fn rename_file(&self, path: &str, new_path: &str) -> Result<()> {
        log::debug!("rename_file path={} new_path={}", path, new_path);
        let adapter = self.adapter().await?;
        wrap_err!(
            adapter.move_file(path, new_path).await,
            MoveFailed {
                path: path.to_string(),
                new_path: new_path.to_string()
            }
        )?;
        self.invalidate_cdn_path(path).await;
        Ok(())
    }

    pub async fn copy_file(&self, path: &str, new_path: &str) -> Result<()> {
        log::debug!("copy_file path={} new_path={}", path, new_path);
        let adapter = self.adapter().await?;
        wrap_err!(
            adapter.copy(path, new_path).await,
            CopyFailed {
                path: path.to_string(),
                new_path: new_path.to_string()
            }
        )
    }
}
