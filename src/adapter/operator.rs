use std::time::SystemTime;

use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};
use opendal::{EntryMode, ErrorKind, Operator};

use super::{Adapter, AdapterEntry, ByteStream, EntryStream};
use crate::error::{Error, Result};
use crate::fs::OperationConfig;
use crate::storage::constants::DEFAULT_CHUNK_SIZE;
use crate::utils::path::{child_prefix, ensure_trailing_slash};

/// Write options forwarded to OpenDAL; anything else is dropped.
const CONTENT_TYPE: &str = "content_type";
const CACHE_CONTROL: &str = "cache_control";
const CONTENT_DISPOSITION: &str = "content_disposition";

/// Adapter backed by an OpenDAL operator.
#[derive(Clone)]
pub struct OpenDalAdapter {
    operator: Operator,
}

impl OpenDalAdapter {
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// Open a writer with the recognized options applied.
    async fn writer(&self, path: &str, config: &OperationConfig) -> Result<opendal::Writer> {
        let mut writer = self.operator.writer_with(path);
        for (key, value) in config.iter() {
            match key {
                CONTENT_TYPE => writer = writer.content_type(value),
                CACHE_CONTROL => writer = writer.cache_control(value),
                CONTENT_DISPOSITION => writer = writer.content_disposition(value),
                _ => log::debug!("ignoring write option {}={} for {}", key, value, path),
            }
        }
        Ok(writer.await?)
    }

    /// Stream copy a single file in fixed-size range reads.
    async fn stream_copy(&self, src_path: &str, dest_path: &str) -> Result<u64> {
        let file_size = self.operator.stat(src_path).await?.content_length();
        let mut writer = self.operator.writer(dest_path).await?;
        let mut offset = 0u64;

        while offset < file_size {
            let end = std::cmp::min(offset + DEFAULT_CHUNK_SIZE as u64, file_size);
            let data = self.operator.read_with(src_path).range(offset..end).await?;
            if data.is_empty() {
                break;
            }
            offset += data.len() as u64;
            writer.write(data).await?;
        }

        writer.close().await?;
        log::debug!("stream copied {} -> {} ({} bytes)", src_path, dest_path, offset);
        Ok(offset)
    }

    fn to_entry(entry: &opendal::Entry) -> AdapterEntry {
        let meta = entry.metadata();
        let modified = meta.last_modified().map(SystemTime::from);
        if meta.mode() == EntryMode::DIR {
            AdapterEntry::directory(entry.path(), modified)
        } else {
            AdapterEntry::file(entry.path(), meta.content_length(), modified)
        }
    }
}

/// Read the chunk starting at `offset`, yielding the next offset.
async fn next_chunk(
    operator: Operator,
    path: String,
    offset: u64,
    size: u64,
) -> Result<Option<(Vec<u8>, u64)>> {
    if offset >= size {
        return Ok(None);
    }
    let end = std::cmp::min(offset + DEFAULT_CHUNK_SIZE as u64, size);
    let data = operator.read_with(&path).range(offset..end).await?;
    if data.is_empty() {
        return Ok(None);
    }
    let next = offset + data.len() as u64;
    Ok(Some((data.to_vec(), next)))
}

impl Adapter for OpenDalAdapter {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(self.operator.read(path).await?.to_vec())
    }

    async fn read_stream(&self, path: &str) -> Result<ByteStream> {
        let size = self.operator.stat(path).await?.content_length();
        let operator = self.operator.clone();
        let path = path.to_string();
        let chunks = stream::try_unfold(0u64, move |offset| {
            next_chunk(operator.clone(), path.clone(), offset, size)
        });
        Ok(chunks.boxed())
    }

    async fn write(&self, path: &str, contents: Vec<u8>, config: &OperationConfig) -> Result<()> {
        let mut writer = self.writer(path, config).await?;
        writer.write(contents).await?;
        writer.close().await?;
        Ok(())
    }

    async fn write_stream(
        &self,
        path: &str,
        mut stream: ByteStream,
        config: &OperationConfig,
    ) -> Result<()> {
        let mut writer = self.writer(path, config).await?;
        while let Some(chunk) = stream.next().await {
            writer.write(chunk?).await?;
        }
        writer.close().await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        Ok(self.operator.delete(path).await?)
    }

    async fn move_file(&self, path: &str, new_path: &str) -> Result<()> {
        let capability = self.operator.info().full_capability();
        if capability.rename {
            self.operator.rename(path, new_path).await?;
        } else {
            if capability.copy {
                self.operator.copy(path, new_path).await?;
            } else {
                self.stream_copy(path, new_path).await?;
            }
            self.operator.delete(path).await?;
        }
        Ok(())
    }

    async fn copy(&self, path: &str, new_path: &str) -> Result<()> {
        if self.operator.info().full_capability().copy {
            self.operator.copy(path, new_path).await?;
        } else {
            self.stream_copy(path, new_path).await?;
        }
        Ok(())
    }

    async fn file_exists(&self, path: &str) -> Result<bool> {
        match self.operator.stat(path).await {
            Ok(meta) => Ok(meta.mode() == EntryMode::FILE),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Hybrid directory detection for object storage: stat first; if not found, probe the prefix.
    async fn directory_exists(&self, path: &str) -> Result<bool> {
        if path.trim_matches('/').is_empty() {
            return Ok(true);
        }
        match self.operator.stat(path).await {
            Ok(meta) => Ok(meta.mode() == EntryMode::DIR),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let probe = ensure_trailing_slash(path);
                let entries = self.operator.list_with(&probe).limit(1).await?;
                Ok(!entries.is_empty())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn file_size(&self, path: &str) -> Result<u64> {
        Ok(self.operator.stat(path).await?.content_length())
    }

    async fn last_modified(&self, path: &str) -> Result<SystemTime> {
        self.operator
            .stat(path)
            .await?
            .last_modified()
            .map(SystemTime::from)
            .ok_or_else(|| Error::Backend {
                message: format!("no modification time reported for '{path}'"),
            })
    }

    async fn create_directory(&self, path: &str, config: &OperationConfig) -> Result<()> {
        log::debug!("create_dir path={} options={:?}", path, config);
        let dir = child_prefix(path);
        if dir.is_empty() {
            return Ok(());
        }
        Ok(self.operator.create_dir(&dir).await?)
    }

    async fn delete_directory(&self, path: &str) -> Result<()> {
        let dir = child_prefix(path);
        if dir.is_empty() {
            return Err(Error::Backend {
                message: "refusing to delete the storage root".to_string(),
            });
        }
        Ok(self.operator.remove_all(&dir).await?)
    }

    async fn list(&self, directory: &str, recursive: bool) -> Result<EntryStream> {
        let target = match child_prefix(directory) {
            prefix if prefix.is_empty() => "/".to_string(),
            prefix => prefix,
        };
        let lister = self
            .operator
            .lister_with(&target)
            .recursive(recursive)
            .await?;

        Ok(lister
            .try_filter(move |entry| {
                let own = entry.path() == target || entry.path() == "/";
                future::ready(!own)
            })
            .map_ok(|entry| Self::to_entry(&entry))
            .map_err(Error::from)
            .boxed())
    }
}
