//! Integration tests for the websocket broadcast consumer over real sockets

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use lcd_events::api::websocket::ClientRegistry;
use lcd_events::{Config, Dispatcher, Event, WebsocketConsumer};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_consumer() -> (Dispatcher, SocketAddr, Arc<ClientRegistry>) {
    let mut config = Config::default();
    config.websocket.listen_address = "127.0.0.1:0".to_string();
    config.websocket.endpoint = "/dashboard".to_string();

    let mut dispatcher = Dispatcher::new();
    let mut consumer = WebsocketConsumer::new();
    dispatcher.register(&mut consumer, &config).await.unwrap();

    let addr = consumer.local_addr().unwrap();
    let registry = consumer.registry().unwrap();
    (dispatcher, addr, registry)
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _response) = connect_async(format!("ws://{}/dataSource", addr))
        .await
        .expect("websocket handshake");
    client
}

async fn wait_for_clients(registry: &ClientRegistry, count: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while registry.count() != count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("expected {} clients, found {}", count, registry.count()));
}

async fn next_text(client: &mut Client) -> String {
    let msg = tokio::time::timeout(Duration::from_secs(2), client.next())
        .await
        .expect("frame should arrive")
        .expect("stream open")
        .expect("valid frame");
    msg.to_text().unwrap().to_string()
}

#[tokio::test]
async fn test_broadcast_reaches_every_connected_client() {
    let (dispatcher, addr, registry) = start_consumer().await;

    let mut clients = Vec::new();
    for _ in 0..3 {
        clients.push(connect(addr).await);
    }
    wait_for_clients(&registry, 3).await;

    dispatcher.dispatch(Event::new("temp", "21.5C")).await;

    for client in clients.iter_mut() {
        assert_eq!(next_text(client).await, "temp:21.5C\n");
    }

    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_disconnected_client_leaves_registry() {
    let (dispatcher, addr, registry) = start_consumer().await;

    let mut first = connect(addr).await;
    let mut second = connect(addr).await;
    let mut leaver = connect(addr).await;
    wait_for_clients(&registry, 3).await;

    leaver.close(None).await.unwrap();
    wait_for_clients(&registry, 2).await;

    dispatcher
        .dispatch(Event::new("display", serde_json::json!({"message": "hi"})))
        .await;

    assert_eq!(next_text(&mut first).await, "display:{\"message\":\"hi\"}\n");
    assert_eq!(next_text(&mut second).await, "display:{\"message\":\"hi\"}\n");

    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_events_arrive_in_dispatch_order() {
    let (dispatcher, addr, registry) = start_consumer().await;
    let mut client = connect(addr).await;
    wait_for_clients(&registry, 1).await;

    for i in 0..10 {
        dispatcher.dispatch(Event::new("seq", i)).await;
    }
    for i in 0..10 {
        assert_eq!(next_text(&mut client).await, format!("seq:{}\n", i));
    }

    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_closes_client_connections() {
    let (dispatcher, addr, registry) = start_consumer().await;
    let mut client = connect(addr).await;
    wait_for_clients(&registry, 1).await;

    dispatcher.shutdown().await;
    wait_for_clients(&registry, 0).await;

    let closed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match client.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "server should close the connection on shutdown");
}

#[tokio::test]
async fn test_dashboard_page_served_over_http() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let (dispatcher, addr, _registry) = start_consumer().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /dashboard HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    tokio::time::timeout(Duration::from_secs(2), stream.read_to_string(&mut response))
        .await
        .unwrap()
        .unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("ws://localhost:8080/dataSource"));

    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_client_can_send_without_breaking_feed() {
    let (dispatcher, addr, registry) = start_consumer().await;
    let mut client = connect(addr).await;
    wait_for_clients(&registry, 1).await;

    client.send(Message::Text("ignored".into())).await.unwrap();
    dispatcher.dispatch(Event::new("mail", "3 new")).await;
    assert_eq!(next_text(&mut client).await, "mail:3 new\n");
    assert_eq!(registry.count(), 1);

    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_completes_with_stalled_client() {
    let (dispatcher, addr, registry) = start_consumer().await;
    let signal = dispatcher.signal().clone();

    // Handshake completes, then the client never reads another frame
    let stalled = connect(addr).await;
    wait_for_clients(&registry, 1).await;

    let payload = "x".repeat(64 * 1024);
    let feeder = tokio::spawn(async move {
        for _ in 0..1000 {
            dispatcher.dispatch(Event::new("bulk", payload.as_str())).await;
        }
    });

    // Let the socket buffers and the client queue fill up
    tokio::time::sleep(Duration::from_secs(1)).await;
    signal.fire();

    tokio::time::timeout(Duration::from_secs(5), signal.wait())
        .await
        .expect("shutdown should not wait on a client that stopped reading");
    wait_for_clients(&registry, 0).await;
    tokio::time::timeout(Duration::from_secs(5), feeder)
        .await
        .expect("dispatch should stop blocking once consumers are gone")
        .unwrap();

    drop(stalled);
}
