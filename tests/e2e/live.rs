//! Tests against a real Disque node.
//!
//! Run with `--include-ignored` and a broker reachable at `DISQUE_URL`
//! (default `127.0.0.1:7711`). The harness wipes the node between tests
//! with `DEBUG FLUSHALL`.

use std::time::Duration;

use disque::{Client, GetOptions};

use crate::utils::{self, DISQUE_URL};

#[ignore = "this test requires a running Disque node"]
#[tokio::test]
async fn liveness() {
    let c = Client::connect_to(DISQUE_URL.as_str()).await.unwrap();
    assert_eq!(c.ping().await.unwrap(), "PONG");
}

#[ignore = "this test requires a running Disque node"]
#[tokio::test]
async fn enqueue_and_observe_length() {
    utils::flush_all(DISQUE_URL.as_str()).await.unwrap();
    let c = Client::connect_to(DISQUE_URL.as_str()).await.unwrap();

    let id = c.send_data("foo", "bar", Duration::from_secs(1)).await.unwrap();
    assert!(!id.is_empty());
    assert_eq!(c.queue_len("foo").await.unwrap(), 1);
}

#[ignore = "this test requires a running Disque node"]
#[tokio::test]
async fn consume_with_counters() {
    utils::flush_all(DISQUE_URL.as_str()).await.unwrap();
    let c = Client::connect_to(DISQUE_URL.as_str()).await.unwrap();

    let first = c.send_data("foo", "bar", Duration::from_secs(1)).await.unwrap();
    let second = c.send_data("foo", "baz", Duration::from_secs(1)).await.unwrap();

    let opts = GetOptions {
        count: 2,
        no_hang: true,
        timeout: Duration::from_secs(1),
        with_counters: true,
    };
    let jobs = c.fetch_jobs(&opts, &["foo"]).await.unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, first);
    assert_eq!(jobs[0].body, b"bar");
    assert_eq!(jobs[1].id, second);
    assert_eq!(jobs[1].body, b"baz");
    assert_eq!(jobs[0].nacks, 0);
    assert_eq!(jobs[0].additional_deliveries, 0);

    c.ack_jobs(&jobs).await.unwrap();
}
