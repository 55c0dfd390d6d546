use crate::*;
use futures::{StreamExt, TryStreamExt, stream};
use std::sync::atomic::AtomicUsize;
use std::time::{Duration, SystemTime};
use stowfs::error::{Error, Result};
use stowfs::fs::VISIBILITY;
use stowfs::{Filesystem, FsSettings, MemoryAdapter, OperationConfig, Visibility};

pub fn tests(tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        test_write_then_read,
        test_write_annotates_private_visibility,
        test_write_annotates_public_visibility,
        test_write_failure_carries_cause,
        test_stream_roundtrip,
        test_read_missing_file,
        test_file_exists,
        test_file_size_and_date_modified,
        test_metadata_of_missing_file,
        test_delete_file,
        test_delete_missing_file_is_swallowed,
        test_delete_failure_is_swallowed,
        test_rename_file,
        test_rename_missing_file,
        test_rename_file_onto_itself,
        test_copy_file,
        test_copy_missing_file,
        test_cdn_failure_does_not_fail_operation,
        test_adapter_init_failure_is_retried
    ));
}

async fn test_write_then_read(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path(&TEST_FIXTURE.new_dir_path());
    let content = TEST_FIXTURE.new_content(1..4096);

    fs.write(&path, content.clone(), &OperationConfig::default())
        .await?;

    assert_eq!(fs.read(&path).await?, content);
    Ok(())
}

async fn test_write_annotates_private_visibility(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");
    let config = OperationConfig::new()
        .with(VISIBILITY, "public")
        .with("content_type", "text/plain");

    fs.write(&path, b"x".to_vec(), &config).await?;

    let writes = fs.backend().writes();
    assert_eq!(writes.len(), 1);
    let (written_path, written_config) = &writes[0];
    assert_eq!(written_path, &path);
    assert_eq!(written_config.visibility(), Some(Visibility::Private));
    assert_eq!(written_config.get("content_type"), Some("text/plain"));

    Ok(())
}

async fn test_write_annotates_public_visibility(_fs: TestFs) -> Result<()> {
    let fs = Filesystem::new(
        FaultyAdapter::new(MemoryAdapter::new()),
        FsSettings {
            has_urls: true,
            ..FsSettings::default()
        },
    );
    let path = TEST_FIXTURE.new_file_path("");
    let chunks = stream::iter(vec![Ok(b"x".to_vec())]).boxed();

    fs.write_stream(&path, chunks, &OperationConfig::default())
        .await?;

    let writes = fs.backend().writes();
    assert_eq!(writes[0].1.visibility(), Some(Visibility::Public));
    Ok(())
}

async fn test_write_failure_carries_cause(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");
    fs.backend().fail_on(Op::Write, &path);

    let result = fs
        .write(&path, b"nope".to_vec(), &OperationConfig::default())
        .await;
    match result {
        Err(err @ Error::WriteFailed { .. }) => {
            assert!(matches!(&err, Error::WriteFailed { path: p, .. } if *p == path));
            let cause = err.underlying().expect("WriteFailed carries its cause");
            assert!(matches!(cause, Error::Backend { .. }));
            assert!(cause.to_string().contains("injected Write failure"));
        }
        other => panic!("expected WriteFailed, got {other:?}"),
    }
    assert!(!fs.file_exists(&path).await?);

    Ok(())
}

async fn test_stream_roundtrip(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path(&TEST_FIXTURE.new_dir_path());
    let parts: Vec<Vec<u8>> = (0..4).map(|_| TEST_FIXTURE.new_content(1..512)).collect();
    let expected: Vec<u8> = parts.concat();

    let chunks = stream::iter(parts.into_iter().map(Ok)).boxed();
    fs.write_stream(&path, chunks, &OperationConfig::default())
        .await?;

    let read: Vec<Vec<u8>> = fs.read_stream(&path).await?.try_collect().await?;
    assert_eq!(read.concat(), expected);

    Ok(())
}

async fn test_read_missing_file(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");

    let result = fs.read(&path).await;
    assert!(
        matches!(&result, Err(Error::ReadFailed { source, .. }) if matches!(**source, Error::ObjectNotFound { .. })),
        "expected ReadFailed(ObjectNotFound), got {result:?}"
    );
    assert!(matches!(
        fs.read_stream(&path).await,
        Err(Error::ReadFailed { .. })
    ));

    Ok(())
}

async fn test_file_exists(fs: TestFs) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_path();
    let path = TEST_FIXTURE.new_file_path(&dir);

    assert!(!fs.file_exists(&path).await?);
    fs.write(&path, b"1".to_vec(), &OperationConfig::default())
        .await?;
    assert!(fs.file_exists(&path).await?);
    assert!(!fs.file_exists(&dir).await?, "a directory is not a file");

    fs.backend().fail_on(Op::Metadata, &path);
    assert!(matches!(
        fs.file_exists(&path).await,
        Err(Error::ExistenceCheckFailed { .. })
    ));

    Ok(())
}

async fn test_file_size_and_date_modified(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");
    let content = TEST_FIXTURE.new_content(10..100);
    let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);

    fs.write(&path, content.clone(), &OperationConfig::default())
        .await?;
    fs.backend().inner.set_modified(&path, mtime)?;

    assert_eq!(fs.file_size(&path).await?, content.len() as u64);
    assert_eq!(fs.date_modified(&path).await?, mtime);

    Ok(())
}

async fn test_metadata_of_missing_file(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");

    assert!(matches!(
        fs.file_size(&path).await,
        Err(Error::MetadataUnavailable { what: "file size", .. })
    ));
    assert!(matches!(
        fs.date_modified(&path).await,
        Err(Error::MetadataUnavailable { what: "date modified", .. })
    ));

    Ok(())
}

async fn test_delete_file(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");
    fs.write(&path, b"bye".to_vec(), &OperationConfig::default())
        .await?;

    fs.delete_file(&path).await?;

    assert!(!fs.file_exists(&path).await?);
    assert_eq!(fs.backend().invalidated(), vec![path]);
    Ok(())
}

async fn test_delete_missing_file_is_swallowed(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");

    // Deleting a non-existent file should not return an error.
    fs.delete_file(&path).await?;

    assert_eq!(fs.backend().invalidated(), vec![path]);
    Ok(())
}

async fn test_delete_failure_is_swallowed(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");
    fs.write(&path, b"stays".to_vec(), &OperationConfig::default())
        .await?;
    fs.backend().fail_on(Op::Delete, &path);

    fs.delete_file(&path).await?;

    assert!(fs.file_exists(&path).await?, "failed delete leaves the file");
    Ok(())
}

async fn test_rename_file(fs: TestFs) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_path();
    let path = TEST_FIXTURE.new_file_path(&dir);
    let new_path = TEST_FIXTURE.new_file_path(&dir);
    let content = TEST_FIXTURE.new_content(1..256);
    fs.write(&path, content.clone(), &OperationConfig::default())
        .await?;

    fs.rename_file(&path, &new_path).await?;

    assert!(!fs.file_exists(&path).await?);
    assert_eq!(fs.read(&new_path).await?, content);
    assert_eq!(fs.backend().invalidated(), vec![path]);
    Ok(())
}

async fn test_rename_missing_file(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");

    match fs.rename_file(&path, "elsewhere").await {
        Err(Error::MoveFailed {
            path: p, new_path, ..
        }) => {
            assert_eq!(p, path);
            assert_eq!(new_path, "elsewhere");
        }
        other => panic!("expected MoveFailed, got {other:?}"),
    }
    assert!(fs.backend().invalidated().is_empty());

    Ok(())
}

async fn test_rename_file_onto_itself(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");
    fs.write(&path, b"same".to_vec(), &OperationConfig::default())
        .await?;

    fs.rename_file(&path, &path).await?;

    assert!(fs.file_exists(&path).await?);
    assert_eq!(fs.read(&path).await?, b"same");
    Ok(())
}

async fn test_copy_file(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");
    let new_path = TEST_FIXTURE.new_file_path(&TEST_FIXTURE.new_dir_path());
    let content = TEST_FIXTURE.new_content(1..256);
    fs.write(&path, content.clone(), &OperationConfig::default())
        .await?;

    fs.copy_file(&path, &new_path).await?;

    assert_eq!(fs.read(&path).await?, content);
    assert_eq!(fs.read(&new_path).await?, content);
    Ok(())
}

async fn test_copy_missing_file(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");

    assert!(matches!(
        fs.copy_file(&path, "copy").await,
        Err(Error::CopyFailed { .. })
    ));
    Ok(())
}

async fn test_cdn_failure_does_not_fail_operation(fs: TestFs) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path("");
    fs.write(&path, b"cached".to_vec(), &OperationConfig::default())
        .await?;
    fs.backend().set_cdn_ok(false);

    fs.rename_file(&path, "renamed").await?;
    fs.delete_file("renamed").await?;

    assert_eq!(
        fs.backend().invalidated(),
        vec![path, "renamed".to_string()]
    );
    Ok(())
}

async fn test_adapter_init_failure_is_retried(_fs: TestFs) -> Result<()> {
    let fs = Filesystem::new(
        FlakyBackend {
            failures_left: AtomicUsize::new(1),
            adapter: MemoryAdapter::new(),
        },
        FsSettings::default(),
    );

    assert!(matches!(
        fs.read("anything").await,
        Err(Error::AdapterInit { .. })
    ));

    fs.write("anything", b"ok".to_vec(), &OperationConfig::default())
        .await?;
    assert_eq!(fs.read("anything").await?, b"ok");
    Ok(())
}
