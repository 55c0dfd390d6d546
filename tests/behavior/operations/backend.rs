use crate::*;
use futures::TryStreamExt;
use stowfs::error::Result;
use stowfs::{Filesystem, FsSettings, OpenDalBackend, OperationConfig, StorageConfig};

pub fn tests(tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        test_opendal_write_then_read,
        test_opendal_read_stream,
        test_opendal_copy_file,
        test_opendal_rename_file,
        test_opendal_rename_directory,
        test_opendal_delete_missing_file
    ));
}

fn opendal_fs() -> Filesystem<OpenDalBackend> {
    Filesystem::new(
        OpenDalBackend::new(StorageConfig::memory()),
        FsSettings::default(),
    )
}

async fn test_opendal_write_then_read(_fs: TestFs) -> Result<()> {
    let fs = opendal_fs();
    let path = TEST_FIXTURE.new_file_path(&TEST_FIXTURE.new_dir_path());
    let content = TEST_FIXTURE.new_content(1..4096);
    let config = OperationConfig::new().with("content_type", "application/octet-stream");

    fs.write(&path, content.clone(), &config).await?;

    assert!(fs.file_exists(&path).await?);
    assert_eq!(fs.read(&path).await?, content);
    assert_eq!(fs.file_size(&path).await?, content.len() as u64);
    Ok(())
}

async fn test_opendal_read_stream(_fs: TestFs) -> Result<()> {
    let fs = opendal_fs();
    let path = TEST_FIXTURE.new_file_path("");
    let content = TEST_FIXTURE.new_content(1..8192);
    fs.write(&path, content.clone(), &OperationConfig::default())
        .await?;

    let chunks: Vec<Vec<u8>> = fs.read_stream(&path).await?.try_collect().await?;
    assert_eq!(chunks.concat(), content);
    Ok(())
}

async fn test_opendal_copy_file(_fs: TestFs) -> Result<()> {
    let fs = opendal_fs();
    let path = TEST_FIXTURE.new_file_path("");
    let new_path = TEST_FIXTURE.new_file_path(&TEST_FIXTURE.new_dir_path());
    let content = TEST_FIXTURE.new_content(1..2048);
    fs.write(&path, content.clone(), &OperationConfig::default())
        .await?;

    fs.copy_file(&path, &new_path).await?;

    assert_eq!(fs.read(&path).await?, content);
    assert_eq!(fs.read(&new_path).await?, content);
    Ok(())
}

async fn test_opendal_rename_file(_fs: TestFs) -> Result<()> {
    let fs = opendal_fs();
    let dir = TEST_FIXTURE.new_dir_path();
    let path = TEST_FIXTURE.new_file_path(&dir);
    let new_path = TEST_FIXTURE.new_file_path(&dir);
    fs.write(&path, b"moving".to_vec(), &OperationConfig::default())
        .await?;

    fs.rename_file(&path, &new_path).await?;

    assert!(!fs.file_exists(&path).await?);
    assert_eq!(fs.read(&new_path).await?, b"moving");
    Ok(())
}

async fn test_opendal_rename_directory(_fs: TestFs) -> Result<()> {
    let fs = opendal_fs();
    let root = TEST_FIXTURE.new_dir_path();
    let config = OperationConfig::default();
    fs.write(&format!("{root}/photos/a.jpg"), b"a".to_vec(), &config)
        .await?;
    fs.write(&format!("{root}/photos/2024/b.jpg"), b"b".to_vec(), &config)
        .await?;

    fs.rename_directory(&format!("{root}/photos"), "images")
        .await?;

    assert_eq!(fs.read(&format!("{root}/images/a.jpg")).await?, b"a");
    assert_eq!(fs.read(&format!("{root}/images/2024/b.jpg")).await?, b"b");
    assert!(!fs.file_exists(&format!("{root}/photos/a.jpg")).await?);
    assert!(!fs.file_exists(&format!("{root}/photos/2024/b.jpg")).await?);
    Ok(())
}

async fn test_opendal_delete_missing_file(_fs: TestFs) -> Result<()> {
    let fs = opendal_fs();
    let path = TEST_FIXTURE.new_file_path("");

    fs.delete_file(&path).await?;

    assert!(!fs.file_exists(&path).await?);
    Ok(())
}
