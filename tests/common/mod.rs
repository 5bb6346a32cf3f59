//! Shared utilities for relay integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use relay_proxy::{HttpServer, RelayConfig, ResponseRegistry, Shutdown};

/// A scripted upstream that counts hits and records request heads.
pub struct MockUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw request heads (request line + headers) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Build a raw HTTP/1.1 response with a correct Content-Length.
pub fn http_response(status_line: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut head = format!("HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n", status_line, body.len());
    for (name, value) in headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");

    let mut raw = head.into_bytes();
    raw.extend_from_slice(body);
    raw
}

/// Start an upstream that answers every request with whatever `f` produces.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> MockUpstream
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Vec<u8>> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let (h, r) = (hits.clone(), requests.clone());
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let (f, h, r) = (f.clone(), h.clone(), r.clone());
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                h.fetch_add(1, Ordering::SeqCst);
                r.lock().unwrap().push(head.clone());

                let raw = f(head).await;
                let _ = socket.write_all(&raw).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockUpstream { addr, hits, requests }
}

/// Start an upstream that always returns the same status and body.
pub async fn start_mock_upstream(status_line: &'static str, body: &'static str) -> MockUpstream {
    start_programmable_upstream(move |_| async move {
        http_response(status_line, &[], body.as_bytes())
    })
    .await
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// An axum upstream whose handler reads the full request body, honoring
/// whatever Content-Length the request announces. Records the Host header
/// and body length of each request it finishes.
pub struct BodyReadingUpstream {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<(String, usize)>>>,
}

impl BodyReadingUpstream {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// `(host, body_len)` per completed request.
    pub fn seen(&self) -> Vec<(String, usize)> {
        self.seen.lock().unwrap().clone()
    }
}

pub async fn start_body_reading_upstream() -> BodyReadingUpstream {
    use axum::{body::Bytes, extract::State, http::HeaderMap, routing::any, Router};

    type Seen = Arc<Mutex<Vec<(String, usize)>>>;

    async fn record(State(seen): State<Seen>, headers: HeaderMap, body: Bytes) -> &'static str {
        let host = headers
            .get("host")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        seen.lock().unwrap().push((host, body.len()));
        "hello"
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/{*path}", any(record))
        .route("/", any(record))
        .with_state(seen.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    BodyReadingUpstream { addr, seen }
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A relay server running in the background.
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub registry: ResponseRegistry,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl RunningRelay {
    pub fn proxy_url(&self) -> String {
        format!("http://{}/proxy", self.addr)
    }

    pub async fn post_json(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.proxy_url())
            .json(&body)
            .send()
            .await
            .expect("Relay unreachable")
    }

    pub async fn post_raw(&self, body: &'static str) -> reqwest::Response {
        self.client
            .post(self.proxy_url())
            .body(body)
            .send()
            .await
            .expect("Relay unreachable")
    }
}

impl Drop for RunningRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Test config: loopback only, no environment proxies.
pub fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.system_proxy = false;
    config
}

pub async fn start_relay(config: RelayConfig) -> RunningRelay {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).unwrap();
    let registry = server.registry().clone();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    RunningRelay {
        addr,
        registry,
        client,
        shutdown,
    }
}
