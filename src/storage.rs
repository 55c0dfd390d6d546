use crate::adapter::{FsBackend, OpenDalAdapter};
use crate::error::{Error, Result};
use opendal::Operator;
use std::str::FromStr;

pub mod constants;

/// Storage provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProvider {
    Oss,
    S3,
    Fs,
    Hdfs,
    Memory,
}

impl FromStr for StorageProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "oss" => Ok(Self::Oss),
            "s3" | "minio" => Ok(Self::S3),
            "fs" => Ok(Self::Fs),
            "hdfs" => Ok(Self::Hdfs),
            "memory" => Ok(Self::Memory),
            _ => Err(Error::UnsupportedProvider {
                provider: s.to_string(),
            }),
        }
    }
}

/// Unified storage configuration for different providers
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub access_key_secret: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub root_path: Option<String>,
    pub name_node: Option<String>,
}

impl StorageConfig {
    fn empty(provider: StorageProvider, bucket: &str) -> Self {
        Self {
            provider,
            bucket: bucket.to_string(),
            access_key_id: None,
            access_key_secret: None,
            endpoint: None,
            region: None,
            root_path: None,
            name_node: None,
        }
    }

    pub fn oss(
        bucket: String,
        access_key_id: String,
        access_key_secret: String,
        region: Option<String>,
    ) -> Self {
        Self {
            access_key_id: Some(access_key_id),
            access_key_secret: Some(access_key_secret),
            region,
            ..Self::empty(StorageProvider::Oss, &bucket)
        }
    }

    pub fn s3(
        bucket: String,
        access_key_id: String,
        secret_access_key: String,
        region: Option<String>,
    ) -> Self {
        Self {
            access_key_id: Some(access_key_id),
            access_key_secret: Some(secret_access_key),
            region,
            ..Self::empty(StorageProvider::S3, &bucket)
        }
    }

    pub fn fs(root_path: String) -> Self {
        Self {
            root_path: Some(root_path),
            ..Self::empty(StorageProvider::Fs, "local")
        }
    }

    pub fn hdfs(name_node: String, root_path: String) -> Self {
        Self {
            root_path: Some(root_path),
            name_node: Some(name_node),
            // Bucket is not really used for HDFS
            ..Self::empty(StorageProvider::Hdfs, "hdfs")
        }
    }

    pub fn memory() -> Self {
        Self::empty(StorageProvider::Memory, "memory")
    }

    /// Build the OpenDAL operator described by this configuration.
    pub fn build_operator(&self) -> Result<Operator> {
        match &self.provider {
            StorageProvider::Oss => {
                let mut builder = opendal::services::Oss::default().bucket(&self.bucket);
                if let Some(access_key_id) = &self.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }
                if let Some(access_key_secret) = &self.access_key_secret {
                    builder = builder.access_key_secret(access_key_secret);
                }
                if let Some(endpoint) = &self.endpoint {
                    builder = builder.endpoint(endpoint);
                }
                Ok(Operator::new(builder)?.finish())
            }
            StorageProvider::S3 => {
                let mut builder = opendal::services::S3::default().bucket(&self.bucket);
                if let Some(access_key_id) = &self.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }
                if let Some(secret_access_key) = &self.access_key_secret {
                    builder = builder.secret_access_key(secret_access_key);
                }
                if let Some(region) = &self.region {
                    builder = builder.region(region);
                }
                if let Some(endpoint) = &self.endpoint {
                    builder = builder.endpoint(endpoint);
                }
                Ok(Operator::new(builder)?.finish())
            }
            StorageProvider::Fs => {
                let root = self
                    .root_path
                    .as_deref()
                    .unwrap_or(constants::DEFAULT_FS_ROOT);
                let builder = opendal::services::Fs::default().root(root);
                Ok(Operator::new(builder)?.finish())
            }
            StorageProvider::Memory => {
                let mut builder = opendal::services::Memory::default();
                if let Some(root) = &self.root_path {
                    builder = builder.root(root);
                }
                Ok(Operator::new(builder)?.finish())
            }
            StorageProvider::Hdfs => {
                #[cfg(feature = "hdfs")]
                {
                    let root = self.root_path.as_deref().unwrap_or("/");
                    let name_node = self.name_node.as_deref().unwrap_or_default();
                    let builder = opendal::services::Hdfs::default()
                        .root(root)
                        .name_node(name_node);
                    Ok(Operator::new(builder)?.finish())
                }

                #[cfg(not(feature = "hdfs"))]
                {
                    Err(Error::UnsupportedProvider {
                        provider: "hdfs (feature disabled)".to_string(),
                    })
                }
            }
        }
    }
}

/// Filesystem backed by an OpenDAL operator built from a [`StorageConfig`].
///
/// The operator is only constructed when the facade first needs it.
#[derive(Debug, Clone)]
pub struct OpenDalBackend {
    config: StorageConfig,
}

impl OpenDalBackend {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl FsBackend for OpenDalBackend {
    type Adapter = OpenDalAdapter;

    fn create_adapter(&self) -> Result<Self::Adapter> {
        log::debug!(
            "building operator provider={:?} bucket={}",
            self.config.provider,
            self.config.bucket
        );
        Ok(OpenDalAdapter::new(self.config.build_operator()?))
    }
}
