// Directory operations emulated over flat or hierarchical key spaces
use super::{Filesystem, OperationConfig};
use crate::adapter::{Adapter, FsBackend};
use crate::error::{Error, InvalidPathSnafu, ObjectNotFoundSnafu, Result};
use crate::utils::path::{directory_key, replace_prefix, sibling_path};
use crate::wrap_err;
use futures::stream::TryStreamExt;
use snafu::ensure;

impl<B: FsBackend> Filesystem<B> {
    /// Check whether a directory exists.
    ///
    /// The adapter is asked about the exact key: trailing slashes are trimmed and
    /// one is re-appended only when the backend's folders carry it.
    pub async fn directory_exists(&self, path: &str) -> Result<bool> {
        let key = directory_key(path, self.settings.folders_have_trailing_slashes);
        log::debug!("directory_exists path={} key={}", path, key);
        let adapter = self.adapter().await?;
        wrap_err!(
            adapter.directory_exists(&key).await,
            ExistenceCheckFailed { path: key }
        )
    }

    pub async fn create_directory(&self, path: &str, config: &OperationConfig) -> Result<()> {
        log::debug!("create_directory path={}", path);
        let adapter = self.adapter().await?;
        wrap_err!(
            adapter.create_directory(path, config).await,
            DirectoryCreateFailed {
                path: path.to_string()
            }
        )
    }

    /// Delete a directory and everything below it.
    ///
    /// Unlike file deletion, a backend failure here is reported to the caller.
    pub async fn delete_directory(&self, path: &str) -> Result<()> {
        log::debug!("delete_directory path={}", path);
        let adapter = self.adapter().await?;
        wrap_err!(
            adapter.delete_directory(path).await,
            DirectoryDeleteFailed {
                path: path.to_string()
            }
        )?;
        self.invalidate_cdn_path(path).await;
        Ok(())
    }

    /// Rename a directory to `new_name`, keeping it at the same depth.
    ///
    /// `new_name` is a single path segment; surrounding slashes are trimmed and
    /// anything empty or nested is rejected with `InvalidPath`.
    ///
    /// Every file below `path` is moved one at a time, in listing order, to the
    /// same relative position under the new path. The old hierarchy's directories
    /// are removed afterwards on a best-effort basis. There is no rollback: when
    /// some moves fail the remaining files are still attempted, the old hierarchy
    /// is left in place, and `PartialRename` lists the files that stayed behind.
    pub async fn rename_directory(&self, path: &str, new_name: &str) -> Result<()> {
        let path = path.trim_matches('/');
        ensure!(!path.is_empty(), InvalidPathSnafu { path });
        let new_name = new_name.trim_matches('/');
        ensure!(
            !new_name.is_empty() && !new_name.contains('/'),
            InvalidPathSnafu { path: new_name }
        );

        let new_path = sibling_path(path, new_name);
        log::debug!("rename_directory path={} new_path={}", path, new_path);
        if new_path == path {
            return Ok(());
        }

        let mut listings = self.list_entries(path, true).await?;
        let mut directories = vec![path.to_string()];
        let mut failed_paths = Vec::new();
        let mut first_failure: Option<Error> = None;
        let mut has_files = false;

        while let Some(listing) = listings.try_next().await? {
            let uri = listing.uri();
            if listing.is_dir() {
                directories.push(uri);
                continue;
            }

            has_files = true;
            let target = replace_prefix(&uri, path, &new_path);
            if let Err(e) = self.rename_file(&uri, &target).await {
                log::warn!("unable to move {} while renaming {}: {}", uri, path, e);
                failed_paths.push(uri);
                first_failure.get_or_insert(e);
            }
        }

        if let Some(source) = first_failure {
            return Err(Error::PartialRename {
                path: path.to_string(),
                failed_paths,
                source: Box::new(source),
            });
        }

        // Moving zero files cannot bring the new directory into existence.
        if !has_files {
            ensure!(
                self.directory_exists(path).await?,
                ObjectNotFoundSnafu { path }
            );
            self.delete_directory(path).await?;
            self.create_directory(&new_path, &OperationConfig::default())
                .await?;
        }

        // Whether stale directory objects exist at all depends on the backend.
        for dir in directories {
            if let Err(e) = self.delete_directory(&dir).await {
                log::warn!("unable to remove stale directory {}: {}", dir, e);
            }
        }

        Ok(())
    }
}
