//! Tests for the memory, filesystem and S3 blob store backends.

use bytes::Bytes;
use fresco_core::{AssetId, ObjectKey, Variant};
use fresco_storage::{
    BlobStore, FileSystemBlobStore, MemoryBlobStore, S3BlobStore, S3Config, StorageErrorKind,
    Visibility,
};
use tempfile::TempDir;

async fn put_get_delete(store: &dyn BlobStore) {
    let id = AssetId::generate();
    let key = ObjectKey::new(&id, Variant::Original);
    let data = Bytes::from_static(b"\x89PNG not really a png");

    store
        .put(&key, data.clone(), "image/png", Visibility::PublicRead)
        .await
        .unwrap();

    let object = store.get(&key).await.unwrap();
    assert_eq!(object.content_type, "image/png");
    assert_eq!(object.content_length, Some(data.len() as u64));
    assert_eq!(object.into_bytes().await.unwrap(), data);

    store.delete(&key).await.unwrap();
    let err = store.get(&key).await.unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::NotFound(_)));

    // Deleting again is not an error
    store.delete(&key).await.unwrap();
}

#[tokio::test]
async fn test_memory_put_get_delete() {
    let store = MemoryBlobStore::new();
    put_get_delete(&store).await;
    assert!(store.is_empty().await);
    assert_eq!(store.backend_name(), "memory");
}

#[tokio::test]
async fn test_filesystem_put_get_delete() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemBlobStore::new(temp_dir.path()).unwrap();
    put_get_delete(&store).await;
    assert_eq!(store.backend_name(), "filesystem");
}

#[tokio::test]
async fn test_memory_put_replaces_existing_object() {
    let store = MemoryBlobStore::new();
    let key = ObjectKey::from_raw("a/thumbnail.jpg");

    store
        .put(&key, Bytes::from_static(b"one"), "image/jpeg", Visibility::Private)
        .await
        .unwrap();
    store
        .put(&key, Bytes::from_static(b"two"), "image/jpeg", Visibility::PublicRead)
        .await
        .unwrap();

    assert_eq!(store.len().await, 1);
    let object = store.object(&key).await.unwrap();
    assert_eq!(object.bytes, Bytes::from_static(b"two"));
    assert_eq!(object.visibility, Visibility::PublicRead);
}

#[tokio::test]
async fn test_memory_clones_share_contents() {
    let store = MemoryBlobStore::new();
    let other = store.clone();
    let key = ObjectKey::from_raw("shared/original");

    store
        .put(&key, Bytes::from_static(b"x"), "image/gif", Visibility::PublicRead)
        .await
        .unwrap();

    assert_eq!(other.keys().await, vec![key]);
}

#[tokio::test]
async fn test_filesystem_layout_follows_keys() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemBlobStore::new(temp_dir.path()).unwrap();
    let id = AssetId::generate();

    for key in ObjectKey::all(&id) {
        store
            .put(&key, Bytes::from_static(b"data"), "image/jpeg", Visibility::PublicRead)
            .await
            .unwrap();
    }

    let asset_dir = temp_dir.path().join(id.to_string());
    assert!(asset_dir.join("original").is_file());
    assert!(asset_dir.join("original.meta.json").is_file());
    assert!(asset_dir.join("thumbnail.jpg").is_file());
    assert!(asset_dir.join("large.jpg").is_file());

    for key in ObjectKey::all(&id) {
        store.delete(&key).await.unwrap();
    }

    // Empty asset directory is cleaned up
    assert!(!asset_dir.exists());
}

#[tokio::test]
async fn test_filesystem_streams_large_objects() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemBlobStore::new(temp_dir.path()).unwrap();
    let key = ObjectKey::from_raw("big/original");
    let data: Vec<u8> = (0..1_000_000u32).map(|i| (i % 251) as u8).collect();

    store
        .put(&key, Bytes::from(data.clone()), "image/png", Visibility::PublicRead)
        .await
        .unwrap();

    let object = store.get(&key).await.unwrap();
    assert_eq!(object.content_length, Some(data.len() as u64));
    assert_eq!(object.into_bytes().await.unwrap().as_ref(), data.as_slice());
}

#[tokio::test]
async fn test_filesystem_rejects_escaping_keys() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemBlobStore::new(temp_dir.path()).unwrap();

    for raw in ["../outside", "/etc/passwd", "a\\b", ""] {
        let key = ObjectKey::from_raw(raw);
        let err = store
            .put(&key, Bytes::from_static(b"x"), "image/png", Visibility::Private)
            .await
            .unwrap_err();
        assert!(
            matches!(err.kind, StorageErrorKind::InvalidKey(_)),
            "expected InvalidKey for {:?}, got {:?}",
            raw,
            err.kind
        );
    }
}

#[tokio::test]
async fn test_filesystem_missing_base_is_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("objects");
    let store = FileSystemBlobStore::new(&base).unwrap();
    std::fs::remove_dir_all(&base).unwrap();

    let key = ObjectKey::from_raw("gone/original");
    let err = store
        .put(&key, Bytes::from_static(b"x"), "image/png", Visibility::PublicRead)
        .await
        .unwrap_err();
    assert!(err.kind.is_connectivity());

    let err = store.delete(&key).await.unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::Unavailable(_)));
}

/// Endpoint on a local port nothing listens on.
fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_s3_unreachable_endpoint_is_connectivity_failure() {
    let config = S3Config::new("assets", "key", "secret")
        .with_endpoint(closed_endpoint())
        .with_path_style(true)
        .with_max_attempts(1);
    let store = S3BlobStore::new(&config).unwrap();
    let key = ObjectKey::from_raw("abc/original");

    let err = store
        .put(&key, Bytes::from_static(b"x"), "image/png", Visibility::PublicRead)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::Unavailable(_)), "{}", err);

    let err = store.get(&key).await.unwrap_err();
    assert!(err.kind.is_connectivity(), "{}", err);

    let err = store.delete(&key).await.unwrap_err();
    assert!(err.kind.is_connectivity(), "{}", err);
}

/// Round trip against a live bucket, e.g. MinIO:
/// `FRESCO_TEST_S3_ENDPOINT=http://localhost:9000 FRESCO_TEST_S3_BUCKET=fresco cargo test -- --ignored`
#[tokio::test]
#[ignore]
async fn test_s3_put_get_delete() {
    let endpoint = std::env::var("FRESCO_TEST_S3_ENDPOINT").unwrap();
    let bucket = std::env::var("FRESCO_TEST_S3_BUCKET").unwrap();
    let access_key =
        std::env::var("FRESCO_TEST_S3_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".into());
    let secret_key =
        std::env::var("FRESCO_TEST_S3_SECRET_KEY").unwrap_or_else(|_| "minioadmin".into());

    let config = S3Config::new(bucket, access_key, secret_key)
        .with_endpoint(endpoint)
        .with_path_style(true)
        .with_prefix("fresco-test");
    let store = S3BlobStore::new(&config).unwrap();
    put_get_delete(&store).await;
}
