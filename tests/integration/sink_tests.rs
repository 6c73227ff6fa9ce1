//! Remote store delivery against an in-process mock store.

use std::time::Duration;

use axum::http::StatusCode;
use bytes::Bytes;

use raveler_exporter::{
    decode_bodies, Compression, ExportConfig, ExportError, Exporter, HttpSink, RetryPolicy, Slab,
    SlabBounds, SlabShape, SinkError, SlabSink,
};

use super::test_utils::{Fixture, MockStore};

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(Duration::from_millis(1), Duration::from_millis(5))
}

fn sink(store: &MockStore) -> HttpSink {
    HttpSink::new(&store.labels_url(), fast_retry(), Duration::from_secs(5), false).unwrap()
}

fn slab() -> Slab {
    Slab {
        bounds: SlabBounds { ox: 512, oy: 0, oz: 32, nx: 512, ny: 256, nz: 32 },
        compression: Compression::Lz4,
        raw_len: 4,
        data: Bytes::from_static(b"abcd"),
    }
}

#[tokio::test]
async fn test_post_url_and_body() {
    let store = MockStore::start(&[]).await;
    sink(&store).put(&slab()).await.unwrap();

    let requests = store.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].path,
        "/api/node/abc123/labels/raw/0_1_2/512_256_32/512_0_32"
    );
    assert_eq!(requests[0].query.as_deref(), Some("compression=lz4"));
    assert_eq!(&requests[0].body[..], b"abcd");
}

#[tokio::test]
async fn test_retries_while_overloaded() {
    let store = MockStore::start(&[
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::OK,
    ])
    .await;
    sink(&store).put(&slab()).await.unwrap();

    let requests = store.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| &r.body[..] == b"abcd"));
}

#[tokio::test]
async fn test_other_status_is_fatal() {
    let store = MockStore::start(&[StatusCode::INTERNAL_SERVER_ERROR]).await;
    let err = sink(&store).put(&slab()).await.unwrap_err();

    assert!(matches!(err, SinkError::Status { status: 500, .. }));
    assert_eq!(store.requests().len(), 1);
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind and drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sink = HttpSink::new(
        &format!("http://{}/api/node/abc/labels", addr),
        fast_retry(),
        Duration::from_secs(5),
        false,
    )
    .unwrap();
    let err = sink.put(&slab()).await.unwrap_err();
    assert!(matches!(err, SinkError::Connection { .. }));
}

#[tokio::test]
async fn test_export_to_store_and_files() {
    let store = MockStore::start(&[StatusCode::SERVICE_UNAVAILABLE]).await;
    let fixture = Fixture::new("store");
    fixture.add_slice(0, 3, 2, &[5, 7, 5, 7, 5, 7]);

    let config = ExportConfig {
        slab: SlabShape::new(2, 2, 1),
        outdir: Some(fixture.output_dir()),
        url: Some(store.labels_url()),
        retry: fast_retry(),
        ..ExportConfig::default()
    };
    let summary = Exporter::new(config).run(&fixture.inputs()).await.unwrap();
    assert_eq!(summary.slabs_written, 2);

    // One overload retry, then both tiles.
    let requests = store.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[1].path,
        "/api/node/abc123/labels/raw/0_1_2/2_2_1/0_0_0"
    );
    assert_eq!(
        requests[2].path,
        "/api/node/abc123/labels/raw/0_1_2/1_2_1/2_0_0"
    );
    assert_eq!(requests[2].query.as_deref(), Some("compression=none"));
    assert_eq!(decode_bodies(&requests[2].body).unwrap(), vec![100, 200]);

    // The same bytes land on disk.
    let file = std::fs::read(fixture.output_dir().join("bodies-1x2x1-2_0_0.dat")).unwrap();
    assert_eq!(&file[..], &requests[2].body[..]);
}

#[tokio::test]
async fn test_store_failure_aborts_export() {
    let store = MockStore::start(&[StatusCode::BAD_REQUEST]).await;
    let fixture = Fixture::new("store-failure");
    fixture.add_slice(0, 1, 1, &[5]);

    let config = ExportConfig {
        url: Some(store.labels_url()),
        retry: fast_retry(),
        ..ExportConfig::default()
    };
    let err = Exporter::new(config).run(&fixture.inputs()).await.unwrap_err();
    assert!(matches!(
        err,
        ExportError::Sink(SinkError::Status { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_dry_run_posts_nothing() {
    let store = MockStore::start(&[]).await;
    let fixture = Fixture::new("store-dry-run");
    fixture.add_slice(0, 1, 1, &[5]);

    let config = ExportConfig {
        url: Some(store.labels_url()),
        dry_run: true,
        ..ExportConfig::default()
    };
    let summary = Exporter::new(config).run(&fixture.inputs()).await.unwrap();
    assert_eq!(summary.slabs_written, 1);
    assert!(store.requests().is_empty());
}
