//! stowfs: a virtual filesystem facade over pluggable storage backends.
//!
//! Backends may only offer a flat key space. The facade emulates directory
//! existence, creation, deletion and rename on top of them and reports failures
//! through one backend-independent error taxonomy.

pub mod adapter;
pub mod config;
pub mod error;
pub mod fs;
pub mod storage;
pub mod utils;

pub use adapter::{Adapter, FsBackend, MemoryAdapter, OpenDalAdapter};
pub use error::{Error, Result};
pub use fs::{EntryKind, Filesystem, FsSettings, Listing, OperationConfig, Visibility};
pub use storage::{OpenDalBackend, StorageConfig, StorageProvider};
