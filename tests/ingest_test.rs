// Integration tests for the controller TCP protocol
//
// Each test binds the listener on an ephemeral loopback port and talks to it
// with a plain TcpStream, the way the robot controller does.

use boxwatch::config::IngestConfig;
use boxwatch::ingest::Listener;
use boxwatch::{HistoryOrder, QueryService, StateTracker, Vocabulary};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

// ── Helpers ───────────────────────────────────────────────────────────────────

async fn start_bridge(config: IngestConfig) -> (SocketAddr, QueryService) {
    let tracker = Arc::new(StateTracker::new("NI_PODATKOV", false));
    let listener = Listener::bind(
        &config,
        Arc::new(Vocabulary::standard()),
        Arc::clone(&tracker),
    )
    .await
    .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(listener.run());
    (addr, QueryService::new(tracker))
}

fn loopback_config() -> IngestConfig {
    IngestConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..IngestConfig::default()
    }
}

/// Send one code and wait for the acknowledgment
async fn send_and_ack(stream: &mut TcpStream, code: &str) {
    stream.write_all(code.as_bytes()).await.unwrap();
    let mut ack = [0u8; 2];
    tokio::time::timeout(Duration::from_secs(5), stream.read_exact(&mut ack))
        .await
        .expect("ack timed out")
        .unwrap();
    assert_eq!(&ack, b"OK");
}

fn history_labels(query: &QueryService) -> Vec<String> {
    query
        .history_view(HistoryOrder::OldestFirst)
        .entries
        .into_iter()
        .map(|e| e.label)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Scenario 1: a single valid code becomes the current state
#[tokio::test]
async fn test_valid_code_sets_state() {
    let (addr, query) = start_bridge(loopback_config()).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    send_and_ack(&mut stream, "PRISPELO").await;

    assert_eq!(query.current_state_view().label, "Prispelo");
    assert_eq!(history_labels(&query), vec!["Prispelo"]);
}

/// Surrounding whitespace (e.g. a trailing newline) is trimmed
#[tokio::test]
async fn test_code_is_trimmed() {
    let (addr, query) = start_bridge(loopback_config()).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    send_and_ack(&mut stream, "  ODKLENJENA\r\n").await;

    assert_eq!(query.current_state_view().label, "Odklenjena");
}

/// Scenario 2: two codes on one connection are recorded in order
#[tokio::test]
async fn test_sequence_recorded_in_order() {
    let (addr, query) = start_bridge(loopback_config()).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    send_and_ack(&mut stream, "PRISPELO").await;
    send_and_ack(&mut stream, "ZAKLENJENA").await;

    assert_eq!(history_labels(&query), vec!["Prispelo", "Zaklenjena"]);
    assert_eq!(query.current_state_view().label, "Zaklenjena");
}

/// Scenario 3: an unknown code changes nothing and gets no acknowledgment
#[tokio::test]
async fn test_unknown_code_ignored() {
    let (addr, query) = start_bridge(loopback_config()).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    send_and_ack(&mut stream, "PRISPELO").await;
    let before = query.current_state_view();

    stream.write_all(b"FOO").await.unwrap();

    let mut buf = [0u8; 2];
    let read = tokio::time::timeout(Duration::from_millis(300), stream.read(&mut buf)).await;
    assert!(read.is_err(), "unknown code must not be acknowledged");

    let after = query.current_state_view();
    assert_eq!(after.label, before.label);
    assert_eq!(after.observed_at, before.observed_at);
    assert_eq!(history_labels(&query).len(), 1);

    // Connection stays usable
    send_and_ack(&mut stream, "ODPRAVLJENO").await;
    assert_eq!(query.current_state_view().label, "Odpravljeno");
}

/// Lenient mode acknowledges unknown codes but still does not record them
#[tokio::test]
async fn test_unknown_code_acknowledged_when_lenient() {
    let config = IngestConfig {
        ack_invalid: true,
        ..loopback_config()
    };
    let (addr, query) = start_bridge(config).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    send_and_ack(&mut stream, "FOO").await;

    assert_eq!(query.current_state_view().label, "NI_PODATKOV");
    assert!(history_labels(&query).is_empty());
}

/// Scenario 4: a peer that closes without sending leaves no trace
#[tokio::test]
async fn test_silent_peer_closes_cleanly() {
    let (addr, query) = start_bridge(loopback_config()).await;

    let stream = TcpStream::connect(addr).await.unwrap();
    drop(stream);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(history_labels(&query).is_empty());
    assert_eq!(query.current_state_view().label, "NI_PODATKOV");

    // Listener keeps accepting
    let mut stream = TcpStream::connect(addr).await.unwrap();
    send_and_ack(&mut stream, "ZAKLENJENA").await;
    assert_eq!(history_labels(&query), vec!["Zaklenjena"]);
}

/// Scenario 5: concurrent connections each commit exactly once
#[tokio::test]
async fn test_concurrent_connections() {
    let (addr, query) = start_bridge(loopback_config()).await;

    let mut a = TcpStream::connect(addr).await.unwrap();
    let mut b = TcpStream::connect(addr).await.unwrap();

    tokio::join!(
        send_and_ack(&mut a, "PRISPELO"),
        send_and_ack(&mut b, "ODKLENJENA"),
    );

    let view = query.history_view(HistoryOrder::OldestFirst);
    let mut labels: Vec<&str> = view.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(view.current.label, *labels.last().unwrap());
    labels.sort_unstable();
    assert_eq!(labels, vec!["Odklenjena", "Prispelo"]);
}

/// Many connections in parallel: no lost or duplicated entries
#[tokio::test]
async fn test_many_connections_lose_nothing() {
    let (addr, query) = start_bridge(loopback_config()).await;
    let codes = ["PRISPELO", "ODPRAVLJENO", "ZAKLENJENA", "ODKLENJENA"];

    let mut tasks = vec![];
    for i in 0..20 {
        let code = codes[i % codes.len()];
        tasks.push(tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            send_and_ack(&mut stream, code).await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let view = query.history_view(HistoryOrder::OldestFirst);
    assert_eq!(view.entries.len(), 20);
    assert_eq!(view.current.label, view.entries.last().unwrap().label);
}

/// Invalid UTF-8 ends only the offending connection
#[tokio::test]
async fn test_decode_error_isolated_to_connection() {
    let (addr, query) = start_bridge(loopback_config()).await;

    let mut bad = TcpStream::connect(addr).await.unwrap();
    bad.write_all(&[0xff, 0xfe, 0xfd]).await.unwrap();

    let mut buf = [0u8; 8];
    let read = tokio::time::timeout(Duration::from_secs(5), bad.read(&mut buf))
        .await
        .expect("server should close the connection");
    assert!(matches!(read, Ok(0) | Err(_)));

    let mut good = TcpStream::connect(addr).await.unwrap();
    send_and_ack(&mut good, "PRISPELO").await;
    assert_eq!(history_labels(&query), vec!["Prispelo"]);
}

/// Idle timeout drops a connection that never speaks
#[tokio::test]
async fn test_idle_timeout_closes_connection() {
    let config = IngestConfig {
        idle_timeout_seconds: Some(1),
        ..loopback_config()
    };
    let (addr, query) = start_bridge(config).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut buf = [0u8; 8];
    let read = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("idle connection should be closed by the server");
    assert!(matches!(read, Ok(0) | Err(_)));
    assert!(history_labels(&query).is_empty());
}
