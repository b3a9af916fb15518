mod common;

use std::time::{Duration, Instant};

use common::{TempRoot, split_response};
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
use vhostd::config::ServerSettings;
use vhostd::error::ServerError;
use vhostd::http::connection::{Connection, ConnectionState};

/// Sends `request` over an in-memory stream and returns everything the
/// connection wrote before closing.
async fn exchange(settings: ServerSettings, request: &[u8]) -> (Vec<u8>, Result<(), ServerError>) {
    let (mut client, server) = duplex(256 * 1024);
    let handle = tokio::spawn(async move { Connection::new(server, settings).run().await });

    client.write_all(request).await.unwrap();
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    (out, handle.await.unwrap())
}

#[tokio::test]
async fn test_serves_html_page() {
    let root = TempRoot::new("conn-html");
    root.write("example.com/index.html", "<html></html>");

    let (raw, result) = exchange(
        root.settings(),
        b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n",
    )
    .await;
    let (head, body) = split_response(&raw);

    assert!(result.is_ok());
    assert!(head.starts_with("HTTP/1.1 200 OK\r\nDate: "), "{head}");
    assert!(head.ends_with("\r\nContent-Type: text/html; charset=utf-8\r\n\r\n"), "{head}");
    assert_eq!(body, b"<html></html>");
}

#[tokio::test]
async fn test_not_found_has_only_date() {
    let root = TempRoot::new("conn-404");

    let (raw, result) = exchange(
        root.settings(),
        b"GET /nothing.html HTTP/1.1\r\nHost: nowhere.test\r\n\r\n",
    )
    .await;
    let text = String::from_utf8(raw).unwrap();

    assert!(result.is_ok());
    assert!(text.starts_with("HTTP/1.1 404 Not Found\r\nDate: "), "{text}");
    assert!(text.ends_with("\r\n\r\n"));
    assert_eq!(text.matches("\r\n").count(), 3);
}

#[tokio::test]
async fn test_binary_body_is_exact() {
    let root = TempRoot::new("conn-binary");
    let contents: Vec<u8> = (0..=255u8).rev().cycle().take(100_000).collect();
    root.write("example.com/data.bin", &contents);

    let (raw, _) = exchange(
        root.settings(),
        b"GET /data.bin HTTP/1.1\r\nHost: example.com\r\n\r\n",
    )
    .await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(!head.contains("Content-Type"));
    assert_eq!(body, contents);
}

#[tokio::test]
async fn test_post_is_not_implemented() {
    let root = TempRoot::new("conn-post");
    root.write("example.com/index.html", "home");

    let (raw, result) = exchange(
        root.settings(),
        b"POST / HTTP/1.1\r\nHost: example.com\r\n\r\n",
    )
    .await;
    let (head, body) = split_response(&raw);

    assert!(result.is_ok());
    assert!(head.starts_with("HTTP/1.1 501 Not Implemented\r\n"), "{head}");
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_garbage_gets_bad_request() {
    let root = TempRoot::new("conn-garbage");

    let (raw, result) = exchange(root.settings(), b"NONSENSE\r\n\r\n").await;
    let (head, _) = split_response(&raw);

    assert!(result.is_ok());
    assert!(head.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{head}");
}

#[tokio::test]
async fn test_malformed_header_gets_bad_request() {
    let root = TempRoot::new("conn-badheader");

    let (raw, _) = exchange(
        root.settings(),
        b"GET / HTTP/1.1\r\nHost: example.com\r\nNoColonHere\r\n\r\n",
    )
    .await;

    assert!(raw.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn test_missing_host_gets_bad_request() {
    let root = TempRoot::new("conn-nohost");

    let (raw, _) = exchange(root.settings(), b"GET / HTTP/1.1\r\n\r\n").await;

    assert!(raw.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn test_traversal_gets_forbidden() {
    let root = TempRoot::new("conn-traversal");
    root.write("secret.txt", "top secret");
    root.mkdir("example.com");

    let (raw, _) = exchange(
        root.settings(),
        b"GET /../secret.txt HTTP/1.1\r\nHost: example.com\r\n\r\n",
    )
    .await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.1 403 Forbidden\r\n"), "{head}");
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_bare_lf_request() {
    let root = TempRoot::new("conn-lf");
    root.write("example.com/index.html", "home");

    let (raw, _) = exchange(root.settings(), b"GET / HTTP/1.1\nHost: example.com\n\n").await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, b"home");
}

#[tokio::test]
async fn test_request_split_across_writes() {
    let root = TempRoot::new("conn-split");
    root.write("example.com/index.html", "home");

    let (mut client, server) = duplex(1024);
    let settings = root.settings();
    let handle = tokio::spawn(async move { Connection::new(server, settings).run().await });

    client.write_all(b"GET / HT").await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    client.write_all(b"TP/1.1\r\nHost: exam").await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    client.write_all(b"ple.com\r\n\r\n").await.unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    let (head, body) = split_response(&out);

    assert!(handle.await.unwrap().is_ok());
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, b"home");
}

#[tokio::test]
async fn test_keep_alive_still_closes() {
    let root = TempRoot::new("conn-keepalive");
    root.write("example.com/index.html", "home");

    // read_to_end only returns once the server closes its side
    let (raw, result) = exchange(
        root.settings(),
        b"GET / HTTP/1.1\r\nHost: example.com\r\nConnection: keep-alive\r\n\r\n",
    )
    .await;

    assert!(result.is_ok());
    assert!(raw.starts_with(b"HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_truncated_request_gets_bad_request() {
    let root = TempRoot::new("conn-truncated");

    let (mut client, server) = duplex(1024);
    let settings = root.settings();
    let handle = tokio::spawn(async move { Connection::new(server, settings).run().await });

    client.write_all(b"GET / HTTP/1.1\r\nHost: exam").await.unwrap();
    client.shutdown().await.unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    assert!(handle.await.unwrap().is_ok());
    assert!(out.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn test_silent_client_gets_nothing() {
    let root = TempRoot::new("conn-silent");

    let (mut client, server) = duplex(1024);
    let settings = root.settings();
    let handle = tokio::spawn(async move { Connection::new(server, settings).run().await });

    client.shutdown().await.unwrap();
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    assert!(handle.await.unwrap().is_ok());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_read_deadline_closes_connection() {
    let root = TempRoot::new("conn-deadline");
    let settings = ServerSettings {
        read_timeout: Duration::from_millis(50),
        ..root.settings()
    };

    let (mut client, server) = duplex(1024);
    let handle = tokio::spawn(async move { Connection::new(server, settings).run().await });

    client.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    assert!(matches!(handle.await.unwrap(), Err(ServerError::Timeout(_))));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_read_deadline_covers_whole_header_block() {
    let root = TempRoot::new("conn-trickle");
    let settings = ServerSettings {
        read_timeout: Duration::from_millis(300),
        ..root.settings()
    };

    let (mut client, server) = duplex(1024);
    let handle = tokio::spawn(async move { Connection::new(server, settings).run().await });

    // Each byte arrives well inside the deadline, the block as a whole does not
    let started = Instant::now();
    for &byte in b"GET / HTTP/1.1\r\nX-Slow: aaaaaaaaaaaaaaaaaaaa" {
        if client.write_all(&[byte]).await.is_err() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    assert!(matches!(handle.await.unwrap(), Err(ServerError::Timeout(_))));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_host_directory_is_used_as_sent() {
    let root = TempRoot::new("conn-host-verbatim");
    root.write("Example.COM/index.html", "mixed case");
    root.write("bücher.de/a.txt", "umlaut");

    let (mixed, _) = exchange(
        root.settings(),
        b"GET /index.html HTTP/1.1\r\nHost: Example.COM\r\n\r\n",
    )
    .await;
    let (idn, _) = exchange(
        root.settings(),
        "GET /a.txt HTTP/1.1\r\nHost: bücher.de\r\n\r\n".as_bytes(),
    )
    .await;

    assert!(mixed.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert!(mixed.ends_with(b"mixed case"));
    assert!(idn.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert!(idn.ends_with(b"umlaut"));
}

#[tokio::test]
async fn test_non_utf8_ignored_header_is_served() {
    let root = TempRoot::new("conn-latin1");
    root.write("example.com/a.txt", "plain");

    let (raw, result) = exchange(
        root.settings(),
        b"GET /a.txt HTTP/1.1\r\nHost: example.com\r\nUser-Agent: caf\xe9\r\n\r\n",
    )
    .await;
    let (head, body) = split_response(&raw);

    assert!(result.is_ok());
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"), "{head}");
    assert_eq!(body, b"plain");
}

#[tokio::test]
async fn test_oversized_header_block_gets_bad_request() {
    let root = TempRoot::new("conn-oversized");
    let settings = ServerSettings {
        max_header_bytes: 256,
        ..root.settings()
    };

    let mut request = b"GET / HTTP/1.1\r\nHost: example.com\r\nX-Pad: ".to_vec();
    request.extend(std::iter::repeat_n(b'a', 1024));

    let (raw, result) = exchange(settings, &request).await;

    assert!(result.is_ok());
    assert!(raw.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn test_state_is_closed_after_run() {
    let root = TempRoot::new("conn-state");
    root.write("example.com/index.html", "home");

    let (mut client, server) = duplex(4096);
    client
        .write_all(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n")
        .await
        .unwrap();

    let mut conn = Connection::new(server, root.settings());
    assert!(matches!(conn.state(), ConnectionState::AwaitingRequest));

    conn.run().await.unwrap();
    assert!(matches!(conn.state(), ConnectionState::Closed));

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    assert!(out.ends_with(b"home"));
}
