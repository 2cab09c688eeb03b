//! Integration tests for the file registry and quota accounting.

mod helpers;

use bytes::Bytes;
use futures::TryStreamExt;

use drivebox_core::error::ErrorKind;

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_upload_charges_quota_and_stores_blob() {
    let app = helpers::TestApp::new().await;
    let user = app.user().await;

    let file = app
        .files
        .upload(user, None, "a.txt", Some("text/plain"), Bytes::from_static(b"hello"))
        .await
        .unwrap();

    assert_eq!(file.size_bytes, 5);
    assert!(file.storage_key.starts_with(&format!("{user}/")));
    assert!(file.storage_key.ends_with("-a.txt"));
    assert!(app.blob_store.contains(&file.storage_key));
    assert_eq!(app.blob_store.mime_type_of(&file.storage_key).as_deref(), Some("text/plain"));
    assert_eq!(app.storage_used(user).await, 5);

    let usage = app.quotas.usage(user).await.unwrap();
    assert_eq!(usage.storage_used, 5);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_upload_beyond_quota_is_rejected_and_charges_nothing() {
    let app = helpers::TestApp::new().await;
    let user = app.user_with_quota(10).await;

    app.files
        .upload(user, None, "a.txt", None, Bytes::from_static(b"123456"))
        .await
        .unwrap();

    let err = app
        .files
        .upload(user, None, "b.txt", None, Bytes::from_static(b"12345"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);

    // The failed upload left no blob and no charge.
    assert_eq!(app.storage_used(user).await, 6);
    assert_eq!(app.blob_store.len(), 1);

    // An upload that exactly fills the budget succeeds.
    app.files
        .upload(user, None, "c.txt", None, Bytes::from_static(b"1234"))
        .await
        .unwrap();
    assert_eq!(app.storage_used(user).await, 10);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_concurrent_uploads_never_overshoot_the_budget() {
    let app = helpers::TestApp::new().await;
    let user = app.user_with_quota(10).await;

    // Four 4-byte uploads against a 10-byte budget: exactly two fit.
    let payload = Bytes::from_static(b"1234");
    let (a, b, c, d) = tokio::join!(
        app.files.upload(user, None, "a.bin", None, payload.clone()),
        app.files.upload(user, None, "b.bin", None, payload.clone()),
        app.files.upload(user, None, "c.bin", None, payload.clone()),
        app.files.upload(user, None, "d.bin", None, payload.clone()),
    );

    let results = [a, b, c, d];
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 2);
    for rejected in results.iter().filter(|r| r.is_err()) {
        assert_eq!(
            rejected.as_ref().unwrap_err().kind,
            ErrorKind::QuotaExceeded
        );
    }

    assert_eq!(app.storage_used(user).await, 8);
    assert_eq!(app.blob_store.len(), 2);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_upload_blob_write_failure_rolls_back_the_charge() {
    let app = helpers::TestApp::new().await;
    let user = app.user().await;

    app.blob_store.set_fail_writes(true);
    let err = app
        .files
        .upload(user, None, "a.txt", None, Bytes::from_static(b"hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BlobWriteFailed);

    assert_eq!(app.storage_used(user).await, 0);
    assert!(app.blob_store.is_empty());

    // The name is still free afterwards.
    app.blob_store.set_fail_writes(false);
    app.files
        .upload(user, None, "a.txt", None, Bytes::from_static(b"hello"))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_upload_duplicate_name_in_folder_collides() {
    let app = helpers::TestApp::new().await;
    let user = app.user().await;

    app.files
        .upload(user, None, "a.txt", None, Bytes::from_static(b"x"))
        .await
        .unwrap();
    let err = app
        .files
        .upload(user, None, "a.txt", None, Bytes::from_static(b"y"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NameCollision);
    assert_eq!(app.storage_used(user).await, 1);

    // The same name in a different folder is fine.
    let docs = app.folders.create_folder(user, None, "docs").await.unwrap();
    app.files
        .upload(user, Some(docs.id), "a.txt", None, Bytes::from_static(b"y"))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_upload_over_size_limit_is_rejected() {
    let app = helpers::TestApp::new().await;
    let user = app.user().await;

    let oversized = Bytes::from(vec![0u8; 5_242_881]);
    let err = app
        .files
        .upload(user, None, "big.bin", None, oversized)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(app.blob_store.is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_upload_into_missing_folder_is_not_found() {
    let app = helpers::TestApp::new().await;
    let user = app.user().await;

    let err = app
        .files
        .upload(
            user,
            Some(uuid::Uuid::new_v4()),
            "a.txt",
            None,
            Bytes::from_static(b"x"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_list_is_newest_first_with_signed_urls() {
    let app = helpers::TestApp::new().await;
    let user = app.user().await;

    app.files
        .upload(user, None, "first.txt", None, Bytes::from_static(b"1"))
        .await
        .unwrap();
    app.files
        .upload(user, None, "second.txt", None, Bytes::from_static(b"2"))
        .await
        .unwrap();

    let listings = app.files.list(user, None).await.unwrap();
    let names: Vec<_> = listings.iter().map(|l| l.file.name.as_str()).collect();
    assert_eq!(names, ["second.txt", "first.txt"]);
    for listing in &listings {
        assert!(listing.url.starts_with("memory://"));
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_rename_keeps_blob_and_storage_key() {
    let app = helpers::TestApp::new().await;
    let user = app.user().await;

    let file = app
        .files
        .upload(user, None, "a.txt", None, Bytes::from_static(b"hello"))
        .await
        .unwrap();

    let renamed = app.files.rename(user, file.id, "b.txt").await.unwrap();
    assert_eq!(renamed.name, "b.txt");
    assert_eq!(renamed.storage_key, file.storage_key);
    assert!(app.blob_store.contains(&file.storage_key));

    // Renaming onto an occupied name collides.
    app.files
        .upload(user, None, "c.txt", None, Bytes::from_static(b"x"))
        .await
        .unwrap();
    let err = app.files.rename(user, file.id, "c.txt").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NameCollision);

    // Renaming to the current name is a no-op.
    let same = app.files.rename(user, file.id, "b.txt").await.unwrap();
    assert_eq!(same.name, "b.txt");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_releases_quota_and_removes_blob() {
    let app = helpers::TestApp::new().await;
    let user = app.user().await;

    let file = app
        .files
        .upload(user, None, "a.txt", None, Bytes::from_static(b"hello"))
        .await
        .unwrap();
    assert_eq!(app.storage_used(user).await, 5);

    app.files.delete(user, file.id).await.unwrap();
    assert_eq!(app.storage_used(user).await, 0);
    assert!(!app.blob_store.contains(&file.storage_key));

    let err = app.files.delete(user, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_download_streams_the_stored_bytes() {
    let app = helpers::TestApp::new().await;
    let user = app.user().await;

    let file = app
        .files
        .upload(user, None, "a.txt", None, Bytes::from_static(b"hello world"))
        .await
        .unwrap();

    let (meta, stream) = app.files.download(user, file.id).await.unwrap();
    assert_eq!(meta.id, file.id);

    let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
    let mut body = Vec::new();
    for chunk in &chunks {
        body.extend_from_slice(chunk);
    }
    assert_eq!(body, b"hello world");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_file_of_another_user_is_invisible() {
    let app = helpers::TestApp::new().await;
    let alice = app.user().await;
    let bob = app.user().await;

    let file = app
        .files
        .upload(alice, None, "a.txt", None, Bytes::from_static(b"x"))
        .await
        .unwrap();

    let err = app.files.download(bob, file.id).await.map(|_| ()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app.files.delete(bob, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(app.storage_used(alice).await, 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_register_user_is_idempotent() {
    let app = helpers::TestApp::new().await;
    let user = app.user().await;

    app.files
        .upload(user, None, "a.txt", None, Bytes::from_static(b"hello"))
        .await
        .unwrap();

    // Re-registering keeps the usage counter.
    let quota = app.quotas.register_user(user).await.unwrap();
    assert_eq!(quota.storage_used, 5);

    let usage = app.quotas.usage(user).await.unwrap();
    assert_eq!(usage.storage_used, 5);
    assert_eq!(usage.remaining, quota.quota_max - 5);
}
