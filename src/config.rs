use std::env;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::fs::FsSettings;
use crate::storage::constants::DEFAULT_FS_ROOT;
use crate::storage::{StorageConfig, StorageProvider};

// Read `primary_key`, falling back to a provider-specific `secondary_key`.
fn get_env_var(primary_key: &str, secondary_key: &str) -> Result<String> {
    env::var(primary_key)
        .or_else(|_| env::var(secondary_key))
        .map_err(|_| Error::MissingEnvVar {
            key: format!("{primary_key} or {secondary_key}"),
        })
}

fn get_optional_env_var(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| env::var(key).ok())
}

/// Parse a boolean setting value.
fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn get_bool_env_var(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Ok(value) => parse_bool(key, &value),
        Err(_) => Ok(default),
    }
}

/// Load facade settings from environment variables
pub fn load_settings() -> Result<FsSettings> {
    let defaults = FsSettings::default();
    Ok(FsSettings {
        has_urls: get_bool_env_var("STORAGE_HAS_URLS", defaults.has_urls)?,
        folders_have_trailing_slashes: get_bool_env_var(
            "STORAGE_FOLDERS_HAVE_TRAILING_SLASHES",
            defaults.folders_have_trailing_slashes,
        )?,
    })
}

/// Load storage configuration from environment variables
pub fn load_storage_config() -> Result<StorageConfig> {
    let provider_str = env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "fs".to_string());
    let provider = StorageProvider::from_str(&provider_str)?;

    match provider {
        StorageProvider::Oss => load_oss_config(),
        StorageProvider::S3 => load_s3_config(&provider_str),
        StorageProvider::Fs => Ok(load_fs_config()),
        StorageProvider::Hdfs => load_hdfs_config(),
        StorageProvider::Memory => Ok(StorageConfig::memory()),
    }
}

/// Load OSS (Alibaba Cloud) configuration
fn load_oss_config() -> Result<StorageConfig> {
    let bucket = get_env_var("STORAGE_BUCKET", "OSS_BUCKET")?;
    let access_key_id = get_env_var("STORAGE_ACCESS_KEY_ID", "OSS_ACCESS_KEY_ID")?;
    let access_key_secret = get_env_var("STORAGE_ACCESS_KEY_SECRET", "OSS_ACCESS_KEY_SECRET")?;
    let region = get_optional_env_var(&["STORAGE_REGION", "OSS_REGION"]);
    let endpoint = get_optional_env_var(&["STORAGE_ENDPOINT", "OSS_ENDPOINT"])
        .unwrap_or_else(|| "https://oss-cn-hangzhou.aliyuncs.com".to_string());

    let mut config = StorageConfig::oss(bucket, access_key_id, access_key_secret, region);
    config.endpoint = Some(endpoint);
    Ok(config)
}

/// Load S3 (AWS) or MinIO configuration
fn load_s3_config(provider_str: &str) -> Result<StorageConfig> {
    let is_minio = provider_str.eq_ignore_ascii_case("minio");
    let (bucket_key, id_key, secret_key) = if is_minio {
        ("MINIO_BUCKET", "MINIO_ACCESS_KEY", "MINIO_SECRET_KEY")
    } else {
        ("AWS_S3_BUCKET", "AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY")
    };

    let bucket = get_env_var("STORAGE_BUCKET", bucket_key)?;
    let access_key_id = get_env_var("STORAGE_ACCESS_KEY_ID", id_key)?;
    let secret_access_key = get_env_var("STORAGE_ACCESS_KEY_SECRET", secret_key)?;
    let region = get_optional_env_var(&[
        "STORAGE_REGION",
        "AWS_DEFAULT_REGION",
        "MINIO_DEFAULT_REGION",
    ]);

    let endpoint = if is_minio {
        Some(
            get_optional_env_var(&["STORAGE_ENDPOINT", "MINIO_ENDPOINT"])
                .unwrap_or_else(|| "http://localhost:9000".to_string()),
        )
    } else {
        env::var("STORAGE_ENDPOINT").ok()
    };

    let mut config = StorageConfig::s3(bucket, access_key_id, secret_access_key, region);
    config.endpoint = endpoint;
    Ok(config)
}

/// Load local filesystem configuration
fn load_fs_config() -> StorageConfig {
    let root_path =
        env::var("STORAGE_ROOT_PATH").unwrap_or_else(|_| DEFAULT_FS_ROOT.to_string());
    StorageConfig::fs(root_path)
}

/// Load HDFS configuration
fn load_hdfs_config() -> Result<StorageConfig> {
    let name_node = get_env_var("STORAGE_NAME_NODE", "HDFS_NAME_NODE")?;
    let root_path = env::var("STORAGE_ROOT_PATH").unwrap_or_else(|_| "/".to_string());
    Ok(StorageConfig::hdfs(name_node, root_path))
}
