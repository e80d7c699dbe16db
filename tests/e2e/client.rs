use disque::{Client, Error};

use crate::utils::{self, Broker};

fn pong(cmd: &utils::Command) -> Vec<u8> {
    match &cmd[0][..] {
        b"PING" => utils::simple("PONG"),
        _ => utils::error("ERR unexpected command"),
    }
}

#[tokio::test]
async fn simple_connect() {
    let broker = Broker::spawn(|_, cmd| pong(cmd)).await;
    let c = Client::connect_to(&broker.addr).await.unwrap();
    assert_eq!(c.ping().await.unwrap(), "PONG");
}

#[tokio::test]
async fn connect_fails_when_nothing_listens() {
    // TCP port 1 is reserved; nothing accepts there.
    let err = Client::connect_to("127.0.0.1:1").await.unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[tokio::test]
async fn sequential_calls_reuse_one_connection() {
    let broker = Broker::spawn(|_, cmd| pong(cmd)).await;
    let c = Client::connect_to(&broker.addr).await.unwrap();
    for _ in 0..3 {
        c.ping().await.unwrap();
    }
    assert_eq!(broker.connections(), 1);
}

#[tokio::test]
async fn redials_after_broker_drops_the_connection() {
    let broker = Broker::spawn(|_, cmd| match &cmd[0][..] {
        b"PING" => utils::simple("PONG"),
        // Close the connection without replying.
        b"QLEN" => Vec::new(),
        _ => utils::error("ERR unexpected command"),
    })
    .await;
    let c = Client::connect_to(&broker.addr).await.unwrap();

    let err = c.queue_len("foo").await.unwrap_err();
    assert!(matches!(err, Error::Protocol { .. }));

    // The dead connection was not returned to the pool; the next call
    // dials a fresh one and succeeds.
    assert_eq!(c.ping().await.unwrap(), "PONG");
    assert_eq!(broker.connections(), 2);
}

#[tokio::test]
async fn concurrent_calls_use_distinct_connections() {
    let broker = Broker::spawn(|_, cmd| pong(cmd)).await;
    let c = Client::builder()
        .max_idle(1)
        .connect_to(&broker.addr)
        .await
        .unwrap();

    let mut js = tokio::task::JoinSet::new();
    for _ in 0..4 {
        let c = c.clone();
        js.spawn(async move { c.ping().await });
    }
    while let Some(res) = js.join_next().await {
        res.unwrap().unwrap();
    }
}
