use hostmon_agent::data_source::{DataSource, KeyProcessor, DEFAULT_VALUE};
use hostmon_agent::protocol::{encode, ZbxdProtocol};
use hostmon_agent::registry::{Arity, Item, ItemRegistry, RegistryHandle};
use hostmon_agent::server::serve;
use hostmon_common::value::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Duration;

async fn start(registry: Arc<RegistryHandle>, io_timeout: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let processor: Arc<dyn KeyProcessor> = Arc::new(DataSource::new(registry));
    tokio::spawn(serve(listener, processor, io_timeout));
    addr
}

fn registry(value: &'static str) -> ItemRegistry {
    ItemRegistry::merge([HashMap::from([(
        "agent.ping".to_string(),
        Item::new(Arity::exact(0), move |_| Ok(Value::from(value))),
    )])])
}

async fn query_framed(addr: SocketAddr, key: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(&encode(key)).await.unwrap();
    ZbxdProtocol.receive_response(&mut stream).await.unwrap()
}

#[tokio::test]
async fn answers_framed_and_bare_requests() {
    let handle = Arc::new(RegistryHandle::new(registry("1")));
    let addr = start(Arc::clone(&handle), Duration::from_secs(3)).await;

    assert_eq!(query_framed(addr, "agent.ping").await, "1");
    assert_eq!(query_framed(addr, "no.such.key").await, DEFAULT_VALUE);

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"agent.ping").await.unwrap();
    stream.shutdown().await.unwrap();
    assert_eq!(ZbxdProtocol.receive_response(&mut stream).await.unwrap(), "1");
}

#[tokio::test]
async fn connection_is_closed_after_one_response() {
    let handle = Arc::new(RegistryHandle::new(registry("1")));
    let addr = start(handle, Duration::from_secs(3)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(&encode("agent.ping")).await.unwrap();
    ZbxdProtocol.receive_response(&mut stream).await.unwrap();

    let mut rest = Vec::new();
    stream.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}

#[tokio::test]
async fn reload_is_visible_to_new_connections() {
    let handle = Arc::new(RegistryHandle::new(registry("old")));
    let addr = start(Arc::clone(&handle), Duration::from_secs(3)).await;

    assert_eq!(query_framed(addr, "agent.ping").await, "old");
    handle.install(registry("new"));
    assert_eq!(query_framed(addr, "agent.ping").await, "new");
}

#[tokio::test]
async fn silent_client_is_dropped_and_others_are_served() {
    let handle = Arc::new(RegistryHandle::new(registry("1")));
    let addr = start(handle, Duration::from_millis(200)).await;

    let mut silent = TcpStream::connect(addr).await.unwrap();
    assert_eq!(query_framed(addr, "agent.ping").await, "1");

    let mut rest = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), silent.read_to_end(&mut rest))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(read, 0);
}
