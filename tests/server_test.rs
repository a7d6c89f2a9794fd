//! Lobby server wiring tests.

use futures::StreamExt;
use std::time::Duration;
use strictly_lobby::{DEFAULT_WAITING_MESSAGE, LobbyConfig, LobbyServer};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_util::codec::{Framed, LinesCodec};

fn local_config() -> LobbyConfig {
    LobbyConfig::default()
        .with_telnet_addr("127.0.0.1:0".parse().unwrap())
        .with_websocket_addr("127.0.0.1:0".parse().unwrap())
}

#[tokio::test]
async fn test_bind_requires_a_transport() {
    let config = local_config()
        .with_enable_telnet(false)
        .with_enable_websocket(false);
    assert!(LobbyServer::bind(config).await.is_err());
}

#[tokio::test]
async fn test_bind_skips_disabled_transports() {
    let server = LobbyServer::bind(local_config().with_enable_websocket(false))
        .await
        .unwrap();
    assert!(server.telnet_addr().is_some());
    assert!(server.websocket_addr().is_none());
}

#[tokio::test]
async fn test_serves_telnet_until_shutdown() {
    let server = LobbyServer::bind(local_config().with_waiting_message("Hold on".to_string()))
        .await
        .unwrap();
    let telnet = server.telnet_addr().unwrap();
    assert!(server.websocket_addr().is_some());

    let (stop, stopped) = oneshot::channel::<()>();
    let running = tokio::spawn(server.run_until(async {
        let _ = stopped.await;
    }));

    let stream = TcpStream::connect(telnet).await.unwrap();
    let mut client = Framed::new(stream, LinesCodec::new());
    let greeting = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(greeting, "Hold on");
    assert_ne!(greeting, DEFAULT_WAITING_MESSAGE);

    stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
