/// Integration tests for live WebSocket sessions
///
/// These run a real HTTP server and connect with `awc` clients, covering:
/// - Broadcast of published notifications to every open session
/// - `get_notifications` replies on the requesting connection
/// - Closing on malformed or unsupported frames, remote close and disconnect
/// - Unregistration whenever a session reaches Closed
use actix_web::{dev::ServerHandle, web, web::Bytes, App, HttpServer};
use awc::{ws, Client};
use futures::{SinkExt, Stream, StreamExt};
use notification_hub::config::WebSocketConfig;
use notification_hub::websocket::ServerMessage;
use notification_hub::{handlers, InMemoryNotificationStore, NotificationHub};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

fn hub() -> Arc<NotificationHub> {
    Arc::new(NotificationHub::new(
        Arc::new(InMemoryNotificationStore::new()),
        WebSocketConfig {
            heartbeat_interval: Duration::from_secs(30),
            client_timeout: Duration::from_secs(60),
            ..WebSocketConfig::default()
        },
    ))
}

async fn start_server(hub: Arc<NotificationHub>) -> std::io::Result<(SocketAddr, ServerHandle)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(hub.clone()))
            .configure(handlers::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    actix_rt::spawn(server);
    Ok((addr, handle))
}

macro_rules! connect {
    ($addr:expr) => {
        Client::new()
            .ws(format!("http://{}/ws", $addr))
            .connect()
            .await
            .expect("connect websocket client")
            .1
    };
}

/// Next non-control frame, failing the test after five seconds
async fn next_frame<S, E>(connection: &mut S) -> ws::Frame
where
    S: Stream<Item = Result<ws::Frame, E>> + Unpin,
    E: std::fmt::Debug,
{
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), connection.next())
            .await
            .expect("timed out waiting for frame")
            .expect("connection ended")
            .expect("frame data");
        match frame {
            ws::Frame::Ping(_) | ws::Frame::Pong(_) => continue,
            other => return other,
        }
    }
}

async fn next_message<S, E>(connection: &mut S) -> ServerMessage
where
    S: Stream<Item = Result<ws::Frame, E>> + Unpin,
    E: std::fmt::Debug,
{
    match next_frame(connection).await {
        ws::Frame::Text(bytes) => {
            let text = std::str::from_utf8(&bytes).unwrap();
            ServerMessage::from_json(text).unwrap()
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

async fn expect_close<S, E>(connection: &mut S, code: ws::CloseCode)
where
    S: Stream<Item = Result<ws::Frame, E>> + Unpin,
    E: std::fmt::Debug,
{
    match next_frame(connection).await {
        ws::Frame::Close(Some(reason)) => assert_eq!(reason.code, code),
        other => panic!("expected close frame, got {other:?}"),
    }
}

/// Unregistration runs after the actor stops, so poll for it
async fn wait_for_connections(hub: &NotificationHub, expected: usize) {
    for _ in 0..100 {
        if hub.registry().connection_count().await == expected {
            return;
        }
        actix_rt::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(hub.registry().connection_count().await, expected);
}

#[actix_rt::test]
async fn test_session_roundtrip_and_unregister_on_close() {
    let hub = hub();
    let (addr, handle) = start_server(hub.clone()).await.expect("start server");

    let mut first = connect!(addr);
    let mut second = connect!(addr);
    wait_for_connections(&hub, 2).await;

    let published = hub.publish("Build done", "Target X compiled").await.unwrap();
    for connection in [&mut first, &mut second] {
        match next_message(connection).await {
            ServerMessage::Notification { notification } => assert_eq!(notification, published),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    first
        .send(ws::Message::Text(r#"{"type":"get_notifications"}"#.into()))
        .await
        .unwrap();
    match next_message(&mut first).await {
        ServerMessage::NotificationsList { notifications } => {
            assert_eq!(notifications, vec![published]);
        }
        other => panic!("unexpected message: {other:?}"),
    }

    first
        .send(ws::Message::Text("not json".into()))
        .await
        .unwrap();
    expect_close(&mut first, ws::CloseCode::Invalid).await;
    wait_for_connections(&hub, 1).await;

    drop(second);
    wait_for_connections(&hub, 0).await;

    handle.stop(true).await;
}

#[actix_rt::test]
async fn test_mark_read_and_clear_over_websocket() {
    let hub = hub();
    let (addr, handle) = start_server(hub.clone()).await.expect("start server");
    let mut connection = connect!(addr);
    wait_for_connections(&hub, 1).await;

    let published = hub.publish("Deploy", "v2 is live").await.unwrap();
    next_message(&mut connection).await;

    let mark_read = format!(r#"{{"type":"mark_read","notification_id":"{}"}}"#, published.id);
    connection
        .send(ws::Message::Text(mark_read.into()))
        .await
        .unwrap();
    connection
        .send(ws::Message::Text(r#"{"type":"get_notifications"}"#.into()))
        .await
        .unwrap();
    match next_message(&mut connection).await {
        ServerMessage::NotificationsList { notifications } => assert!(notifications.is_empty()),
        other => panic!("unexpected message: {other:?}"),
    }
    assert!(hub.service().list_all()[0].read);

    // Unknown types and missing ids are logged, and the session stays open
    for frame in [r#"{"type":"subscribe"}"#, r#"{"type":"mark_read"}"#, r#"{"type":"clear_all"}"#] {
        connection.send(ws::Message::Text(frame.into())).await.unwrap();
    }
    connection
        .send(ws::Message::Text(r#"{"type":"get_notifications"}"#.into()))
        .await
        .unwrap();
    match next_message(&mut connection).await {
        ServerMessage::NotificationsList { notifications } => assert!(notifications.is_empty()),
        other => panic!("unexpected message: {other:?}"),
    }
    assert_eq!(hub.service().count(), 0);
    assert_eq!(hub.registry().connection_count().await, 1);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn test_binary_frame_closes_session() {
    let hub = hub();
    let (addr, handle) = start_server(hub.clone()).await.expect("start server");
    let mut connection = connect!(addr);
    wait_for_connections(&hub, 1).await;

    connection
        .send(ws::Message::Binary(Bytes::from_static(b"\x01\x02")))
        .await
        .unwrap();
    expect_close(&mut connection, ws::CloseCode::Unsupported).await;
    wait_for_connections(&hub, 0).await;

    handle.stop(true).await;
}

#[actix_rt::test]
async fn test_remote_close_unregisters() {
    let hub = hub();
    let (addr, handle) = start_server(hub.clone()).await.expect("start server");
    let mut connection = connect!(addr);
    wait_for_connections(&hub, 1).await;

    connection
        .send(ws::Message::Close(Some(ws::CloseCode::Normal.into())))
        .await
        .unwrap();
    expect_close(&mut connection, ws::CloseCode::Normal).await;
    wait_for_connections(&hub, 0).await;

    handle.stop(true).await;
}
