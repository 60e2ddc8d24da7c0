//! Integration tests for the chat server over real TCP connections.

use std::{sync::Arc, time::Duration};

use charla_server::{
    domain::UserRegistry,
    infrastructure::{registry::InMemoryUserRegistry, telemetry::UdpTelemetryReporter},
    ui::{ChatServer, ChatServerConfig},
    usecase::{HandleMessageUseCase, JoinChatUseCase, LeaveChatUseCase, ReportStatsUseCase},
};
use charla_shared::{
    telemetry::decode_records,
    time::{Clock, SystemClock},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream, UdpSocket},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Helper struct to manage an in-process server for one test
struct TestServer {
    addr: std::net::SocketAddr,
    registry: Arc<InMemoryUserRegistry>,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let monitor = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let (server, _monitor) = Self::start_with_monitor(monitor, Duration::from_secs(60)).await;
        server
    }

    async fn start_with_monitor(monitor: UdpSocket, stats_interval: Duration) -> (Self, UdpSocket) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let config = ChatServerConfig {
            monitor_addr: monitor.local_addr().unwrap(),
            stats_interval,
            ..ChatServerConfig::new("127.0.0.1", addr.port())
        };

        let registry = Arc::new(InMemoryUserRegistry::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let server = ChatServer::new(
            config.clone(),
            Arc::new(JoinChatUseCase::new(registry.clone(), clock.clone())),
            Arc::new(LeaveChatUseCase::new(registry.clone())),
            Arc::new(HandleMessageUseCase::new(registry.clone(), clock)),
            Arc::new(ReportStatsUseCase::new(
                registry.clone(),
                Arc::new(UdpTelemetryReporter::new(config.monitor_addr)),
                addr.port(),
            )),
        );

        let shutdown = CancellationToken::new();
        let server_shutdown = shutdown.clone();
        let handle = tokio::spawn(async move {
            server.serve(listener, server_shutdown).await.unwrap();
        });

        (
            TestServer {
                addr,
                registry,
                shutdown,
                handle,
            },
            monitor,
        )
    }

    /// Poll the registry until it holds `expected` sessions
    async fn wait_for_users(&self, expected: usize) {
        tokio::time::timeout(TIMEOUT, async {
            while self.registry.count().await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("registry never reached {} users", expected));
    }

    async fn stop(self) {
        self.shutdown.cancel();
        tokio::time::timeout(TIMEOUT, self.handle)
            .await
            .expect("server did not shut down")
            .unwrap();
    }
}

/// Helper struct for a raw chat client
struct TestClient {
    stream: TcpStream,
}

impl TestClient {
    /// Connect, consume the prompt and send the name
    async fn join(server: &TestServer, name: &str) -> Self {
        let mut client = TestClient {
            stream: TcpStream::connect(server.addr).await.unwrap(),
        };
        client.expect("Ingrese su nombre: ").await;
        client.send(name).await;
        client
    }

    async fn send(&mut self, text: &str) {
        self.send_bytes(text.as_bytes()).await;
    }

    async fn send_bytes(&mut self, payload: &[u8]) {
        self.stream.write_all(payload).await.unwrap();
        self.stream.flush().await.unwrap();
    }

    async fn read_exact_bytes(&mut self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        tokio::time::timeout(TIMEOUT, self.stream.read_exact(&mut buf))
            .await
            .expect("timed out waiting for server output")
            .unwrap();
        buf
    }

    async fn read_exact_text(&mut self, len: usize) -> String {
        String::from_utf8(self.read_exact_bytes(len).await).unwrap()
    }

    async fn expect(&mut self, expected: &str) {
        let received = self.read_exact_text(expected.len()).await;
        assert_eq!(received, expected);
    }

    /// Read until the server closes the connection
    async fn read_to_end(&mut self) -> String {
        let mut buf = Vec::new();
        tokio::time::timeout(TIMEOUT, self.stream.read_to_end(&mut buf))
            .await
            .expect("server did not close the connection")
            .unwrap();
        String::from_utf8(buf).unwrap()
    }
}

#[tokio::test]
async fn test_connection_info_and_broadcast_scenario() {
    // given: alice is connected
    let server = TestServer::start().await;
    let mut alice = TestClient::join(&server, "alice").await;
    server.wait_for_users(1).await;

    // when: alice asks for the connection count
    alice.send("@conexion").await;

    // then:
    alice.expect("Número de usuarios conectados: 1\n").await;

    // when: bob joins and says hi
    let mut bob = TestClient::join(&server, "bob").await;
    server.wait_for_users(2).await;
    alice.expect("bob se ha conectado al chat.\n").await;
    bob.send("hi").await;

    // then: alice receives it, bob's next output is his own command reply
    alice.expect("bob: hi").await;
    bob.send("@conexion").await;
    bob.expect("Número de usuarios conectados: 2\n").await;

    server.stop().await;
}

#[tokio::test]
async fn test_user_list_and_help() {
    // given:
    let server = TestServer::start().await;
    let mut alice = TestClient::join(&server, "alice\n").await;
    server.wait_for_users(1).await;
    let _bob = TestClient::join(&server, "  bob  \r\n").await;
    server.wait_for_users(2).await;
    alice.expect("bob se ha conectado al chat.\n").await;

    // when:
    alice.send("@usuarios\n").await;

    // then: names trimmed, in connection order
    alice.expect("Usuarios conectados:\nalice\nbob\n").await;

    // when:
    alice.send("@h\n").await;

    // then:
    alice.expect("Comandos disponibles:\n").await;

    server.stop().await;
}

#[tokio::test]
async fn test_quit_removes_user_and_notifies_peers() {
    // given:
    let server = TestServer::start().await;
    let mut alice = TestClient::join(&server, "alice").await;
    server.wait_for_users(1).await;
    let mut bob = TestClient::join(&server, "bob").await;
    server.wait_for_users(2).await;
    alice.expect("bob se ha conectado al chat.\n").await;

    // when:
    bob.send("@salir").await;

    // then: bob's connection is closed and alice is told once
    assert_eq!(bob.read_to_end().await, "");
    server.wait_for_users(1).await;
    alice.expect("bob se ha desconectado del chat.\n").await;

    server.stop().await;
}

#[tokio::test]
async fn test_dropped_connection_is_cleaned_up() {
    // given:
    let server = TestServer::start().await;
    let mut alice = TestClient::join(&server, "alice").await;
    server.wait_for_users(1).await;
    let bob = TestClient::join(&server, "bob").await;
    server.wait_for_users(2).await;
    alice.expect("bob se ha conectado al chat.\n").await;

    // when: bob vanishes without a command
    drop(bob);

    // then:
    server.wait_for_users(1).await;
    alice.expect("bob se ha desconectado del chat.\n").await;

    server.stop().await;
}

#[tokio::test]
async fn test_disconnect_before_name_never_joins() {
    // given:
    let server = TestServer::start().await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let mut prompt = vec![0u8; "Ingrese su nombre: ".len()];
    stream.read_exact(&mut prompt).await.unwrap();

    // when: the client closes before naming itself
    drop(stream);
    let _alice = TestClient::join(&server, "alice").await;

    // then: only alice is registered
    server.wait_for_users(1).await;
    let names = server.registry.snapshot().await;
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].as_bytes(), b"alice");

    server.stop().await;
}

#[tokio::test]
async fn test_non_utf8_chat_is_relayed_byte_for_byte() {
    // given:
    let server = TestServer::start().await;
    let mut alice = TestClient::join(&server, "alice").await;
    server.wait_for_users(1).await;
    let mut bob = TestClient::join(&server, "bob").await;
    server.wait_for_users(2).await;
    alice.expect("bob se ha conectado al chat.\n").await;

    // when: bob sends Latin-1 "café"
    bob.send_bytes(b"caf\xe9").await;

    // then: alice gets exactly those bytes behind bob's name
    let expected = b"bob: caf\xe9";
    assert_eq!(alice.read_exact_bytes(expected.len()).await, expected);

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_completes_while_peer_stops_reading() {
    // given: alice never reads, bob floods the chat
    let server = TestServer::start().await;
    let _alice = TestClient::join(&server, "alice").await;
    server.wait_for_users(1).await;
    let mut bob = TestClient::join(&server, "bob").await;
    server.wait_for_users(2).await;
    let flood = vec![b'x'; 20 * 1024 * 1024];
    tokio::time::timeout(TIMEOUT, bob.send_bytes(&flood))
        .await
        .expect("server stopped reading from bob");
    tokio::time::sleep(Duration::from_millis(200)).await;

    // when / then: the server still stops in time
    server.stop().await;
}

#[tokio::test]
async fn test_stats_are_published_to_monitor() {
    // given: a fast statistics interval and a monitor socket
    let monitor = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let (server, monitor) =
        TestServer::start_with_monitor(monitor, Duration::from_millis(100)).await;
    let mut alice = TestClient::join(&server, "alice").await;
    server.wait_for_users(1).await;
    alice.send("@conexion").await;
    alice.expect("Número de usuarios conectados: 1\n").await;

    // when: reports arrive
    let mut buf = vec![0u8; 2048];
    let records = tokio::time::timeout(TIMEOUT, async {
        loop {
            let (len, _) = monitor.recv_from(&mut buf).await.unwrap();
            let records = decode_records(&buf[..len]);
            if records.iter().any(|r| r == "total_messages: 1") {
                return records;
            }
        }
    })
    .await
    .expect("no telemetry received");

    // then:
    assert_eq!(records[0], format!("server_port: {}", server.addr.port()));
    assert!(records.contains(&"connected_users: [alice]".to_string()));
    assert!(records.contains(&"total_users: 1".to_string()));

    server.stop().await;
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    // given: the port is already taken
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();
    let registry = Arc::new(InMemoryUserRegistry::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let config = ChatServerConfig::new("127.0.0.1", port);
    let server = ChatServer::new(
        config.clone(),
        Arc::new(JoinChatUseCase::new(registry.clone(), clock.clone())),
        Arc::new(LeaveChatUseCase::new(registry.clone())),
        Arc::new(HandleMessageUseCase::new(registry.clone(), clock)),
        Arc::new(ReportStatsUseCase::new(
            registry,
            Arc::new(UdpTelemetryReporter::new(config.monitor_addr)),
            port,
        )),
    );

    // when:
    let result = server.run(CancellationToken::new()).await;

    // then:
    assert!(matches!(
        result,
        Err(charla_server::ui::ServerError::Bind { .. })
    ));
}
