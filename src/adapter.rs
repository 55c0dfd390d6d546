// Storage adapter capability trait and the shipped backends
use crate::error::Result;
use crate::fs::OperationConfig;
use futures::stream::BoxStream;
use std::time::SystemTime;

mod memory;
mod operator;

pub use memory::MemoryAdapter;
pub use operator::OpenDalAdapter;

/// Pull-based stream of file content chunks.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

/// Pull-based stream of raw listing entries.
pub type EntryStream = BoxStream<'static, Result<AdapterEntry>>;

/// A raw entry as reported by a backend listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterEntry {
    /// Full key, relative to the backend root. Directories may end with '/'.
    pub path: String,
    pub is_dir: bool,
    pub last_modified: Option<SystemTime>,
    /// Byte size, only reported for files.
    pub size: Option<u64>,
}

impl AdapterEntry {
    pub fn file(path: impl Into<String>, size: u64, last_modified: Option<SystemTime>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            last_modified,
            size: Some(size),
        }
    }

    pub fn directory(path: impl Into<String>, last_modified: Option<SystemTime>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            last_modified,
            size: None,
        }
    }
}

/// Primitive operations a storage backend provides over its key space.
///
/// Implementations report backend failures as raw errors (`OpenDal`, `Io`,
/// `Backend`, `ObjectNotFound`); the facade maps them to normalized kinds.
#[allow(async_fn_in_trait)]
pub trait Adapter {
    /// Read a whole object.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Open an object as a stream of chunks.
    async fn read_stream(&self, path: &str) -> Result<ByteStream>;

    /// Write a whole object, replacing any previous content.
    async fn write(&self, path: &str, contents: Vec<u8>, config: &OperationConfig) -> Result<()>;

    /// Write an object from a stream of chunks.
    async fn write_stream(
        &self,
        path: &str,
        stream: ByteStream,
        config: &OperationConfig,
    ) -> Result<()>;

    async fn delete(&self, path: &str) -> Result<()>;

    async fn move_file(&self, path: &str, new_path: &str) -> Result<()>;

    async fn copy(&self, path: &str, new_path: &str) -> Result<()>;

    async fn file_exists(&self, path: &str) -> Result<bool>;

    /// Check whether the exact directory key exists. Trailing slashes are
    /// significant for backends that store them.
    async fn directory_exists(&self, path: &str) -> Result<bool>;

    async fn file_size(&self, path: &str) -> Result<u64>;

    async fn last_modified(&self, path: &str) -> Result<SystemTime>;

    async fn create_directory(&self, path: &str, config: &OperationConfig) -> Result<()>;

    /// Delete a directory together with everything under it.
    async fn delete_directory(&self, path: &str) -> Result<()>;

    /// Enumerate entries under `directory`, excluding the directory itself.
    async fn list(&self, directory: &str, recursive: bool) -> Result<EntryStream>;
}

/// One kind of filesystem: how to build its adapter and how to tell a caching
/// edge in front of it that a path went stale.
#[allow(async_fn_in_trait)]
pub trait FsBackend {
    type Adapter: Adapter;

    /// Build the adapter. Called at most once per successful facade initialization.
    fn create_adapter(&self) -> Result<Self::Adapter>;

    /// Purge `path` from a CDN sitting in front of the backend.
    ///
    /// The return value is only logged; mutating operations never fail on it.
    async fn invalidate_cdn_path(&self, path: &str) -> bool {
        let _ = path;
        true
    }
}
