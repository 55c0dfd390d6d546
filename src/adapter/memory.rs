//! In-memory backend (for tests and ephemeral volumes)

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use futures::StreamExt;
use futures::stream;

use super::{Adapter, AdapterEntry, ByteStream, EntryStream, FsBackend};
use crate::error::{Error, ObjectNotFoundSnafu, Result};
use crate::fs::OperationConfig;
use crate::utils::path::child_prefix;

#[derive(Debug, Clone)]
enum Node {
    File {
        contents: Vec<u8>,
        modified: SystemTime,
    },
    Directory {
        modified: SystemTime,
    },
}

/// Flat key space kept in memory.
///
/// Files are stored under their key, directory markers under the key with a
/// trailing '/'. A directory also exists implicitly while any file lives under
/// its prefix. Clones share the same key space.
#[derive(Debug, Clone)]
pub struct MemoryAdapter {
    nodes: Arc<RwLock<BTreeMap<String, Node>>>,
    trailing_slashes: bool,
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAdapter {
    /// Create an empty key space whose directory keys carry a trailing slash.
    pub fn new() -> Self {
        Self::with_trailing_slashes(true)
    }

    /// Create an empty key space. When `trailing_slashes` is set, directory
    /// existence probes must use `dir/`; otherwise they must use `dir`.
    pub fn with_trailing_slashes(trailing_slashes: bool) -> Self {
        Self {
            nodes: Arc::new(RwLock::new(BTreeMap::new())),
            trailing_slashes,
        }
    }

    /// Pin the modification time of an existing file or directory marker.
    pub fn set_modified(&self, path: &str, time: SystemTime) -> Result<()> {
        let mut nodes = self.write_nodes();
        let mut key = Self::file_key(path);
        if !nodes.contains_key(&key) {
            key = child_prefix(path);
        }
        let node = nodes
            .get_mut(&key)
            .ok_or_else(|| ObjectNotFoundSnafu { path }.build())?;
        match node {
            Node::File { modified, .. } | Node::Directory { modified } => *modified = time,
        }
        Ok(())
    }

    /// Snapshot of every stored key, directory markers included.
    pub fn paths(&self) -> Vec<String> {
        self.read_nodes().keys().cloned().collect()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.read_nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn file_key(path: &str) -> String {
        path.trim_matches('/').to_string()
    }

    fn read_nodes(&self) -> RwLockReadGuard<'_, BTreeMap<String, Node>> {
        self.nodes.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_nodes(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Node>> {
        self.nodes.write().unwrap_or_else(|e| e.into_inner())
    }

    fn get_file(&self, path: &str) -> Result<(Vec<u8>, SystemTime)> {
        match self.read_nodes().get(&Self::file_key(path)) {
            Some(Node::File { contents, modified }) => Ok((contents.clone(), *modified)),
            _ => ObjectNotFoundSnafu { path }.fail(),
        }
    }

    fn put_file(&self, path: &str, contents: Vec<u8>) -> Result<()> {
        let key = Self::file_key(path);
        if key.is_empty() {
            return Err(Error::Backend {
                message: "cannot write to the root".to_string(),
            });
        }
        let mut nodes = self.write_nodes();
        if let Some(Node::Directory { .. }) = nodes.get(&format!("{key}/")) {
            return Err(Error::Backend {
                message: format!("'{key}' is a directory"),
            });
        }
        nodes.insert(
            key,
            Node::File {
                contents,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn has_prefix(nodes: &BTreeMap<String, Node>, prefix: &str) -> bool {
        nodes
            .range(prefix.to_string()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(prefix))
    }
}

impl Adapter for MemoryAdapter {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.get_file(path).map(|(contents, _)| contents)
    }

    async fn read_stream(&self, path: &str) -> Result<ByteStream> {
        let (contents, _) = self.get_file(path)?;
        Ok(stream::iter(vec![Ok(contents)]).boxed())
    }

    async fn write(&self, path: &str, contents: Vec<u8>, config: &OperationConfig) -> Result<()> {
        log::debug!("memory write path={} options={:?}", path, config);
        self.put_file(path, contents)
    }

    async fn write_stream(
        &self,
        path: &str,
        mut stream: ByteStream,
        config: &OperationConfig,
    ) -> Result<()> {
        let mut contents = Vec::new();
        while let Some(chunk) = stream.next().await {
            contents.extend_from_slice(&chunk?);
        }
        self.write(path, contents, config).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let key = Self::file_key(path);
        match self.write_nodes().remove(&key) {
            Some(_) => Ok(()),
            None => ObjectNotFoundSnafu { path }.fail(),
        }
    }

    async fn move_file(&self, path: &str, new_path: &str) -> Result<()> {
        let (contents, _) = self.get_file(path)?;
        if Self::file_key(path) == Self::file_key(new_path) {
            return Ok(());
        }
        self.put_file(new_path, contents)?;
        self.write_nodes().remove(&Self::file_key(path));
        Ok(())
    }

    async fn copy(&self, path: &str, new_path: &str) -> Result<()> {
        let (contents, _) = self.get_file(path)?;
        self.put_file(new_path, contents)
    }

    async fn file_exists(&self, path: &str) -> Result<bool> {
        Ok(matches!(
            self.read_nodes().get(&Self::file_key(path)),
            Some(Node::File { .. })
        ))
    }

    async fn directory_exists(&self, path: &str) -> Result<bool> {
        let prefix = child_prefix(path);
        if prefix.is_empty() {
            return Ok(true);
        }
        if path.ends_with('/') != self.trailing_slashes {
            return Ok(false);
        }
        Ok(Self::has_prefix(&self.read_nodes(), &prefix))
    }

    async fn file_size(&self, path: &str) -> Result<u64> {
        self.get_file(path)
            .map(|(contents, _)| contents.len() as u64)
    }

    async fn last_modified(&self, path: &str) -> Result<SystemTime> {
        self.get_file(path).map(|(_, modified)| modified)
    }

    async fn create_directory(&self, path: &str, _config: &OperationConfig) -> Result<()> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(());
        }

        let mut nodes = self.write_nodes();
        let components: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        for i in 1..=components.len() {
            let key = components[..i].join("/");
            if let Some(Node::File { .. }) = nodes.get(&key) {
                return Err(Error::Backend {
                    message: format!("'{key}' is a file"),
                });
            }
            nodes.entry(format!("{key}/")).or_insert(Node::Directory {
                modified: SystemTime::now(),
            });
        }
        Ok(())
    }

    async fn delete_directory(&self, path: &str) -> Result<()> {
        let prefix = child_prefix(path);
        if prefix.is_empty() {
            return Err(Error::Backend {
                message: "cannot delete the root".to_string(),
            });
        }
        self.write_nodes().retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }

    async fn list(&self, directory: &str, recursive: bool) -> Result<EntryStream> {
        let prefix = child_prefix(directory);
        let nodes = self.read_nodes();

        // Keyed by path so implicit directories collapse onto their markers.
        let mut entries: BTreeMap<String, AdapterEntry> = BTreeMap::new();
        for (key, node) in nodes.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            if rest.is_empty() {
                continue;
            }

            // Every intermediate segment is an implicit directory.
            let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
            let depth = if recursive { segments.len() - 1 } else { 0 };
            for i in 1..=depth {
                let dir = format!("{prefix}{}/", segments[..i].join("/"));
                entries
                    .entry(dir.clone())
                    .or_insert_with(|| AdapterEntry::directory(dir, None));
            }

            if !recursive && segments.len() > 1 {
                let dir = format!("{prefix}{}/", segments[0]);
                entries
                    .entry(dir.clone())
                    .or_insert_with(|| AdapterEntry::directory(dir, None));
                continue;
            }

            let entry = match node {
                Node::File { contents, modified } => {
                    AdapterEntry::file(key.clone(), contents.len() as u64, Some(*modified))
                }
                Node::Directory { modified } => AdapterEntry::directory(key.clone(), Some(*modified)),
            };
            entries.insert(key.clone(), entry);
        }

        let entries: Vec<Result<AdapterEntry>> = entries.into_values().map(Ok).collect();
        Ok(stream::iter(entries).boxed())
    }
}

impl FsBackend for MemoryAdapter {
    type Adapter = MemoryAdapter;

    fn create_adapter(&self) -> Result<Self::Adapter> {
        Ok(self.clone())
    }
}
