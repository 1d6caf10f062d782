//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use hotel_bff::cache::{CacheStore, MemoryCacheStore};
use hotel_bff::config::BffConfig;
use hotel_bff::lifecycle::Shutdown;
use hotel_bff::supplier::{ApiKeySigner, HttpSupplier, Upstream};
use hotel_bff::HttpServer;

/// A request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.target.split_once('?')?.1;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` sees every request and returns `(status, json_body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let _ = serve_one(socket, f.as_ref()).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn serve_one<F, Fut>(socket: TcpStream, f: &F) -> std::io::Result<()>
where
    F: Fn(RecordedRequest) -> Fut,
    Fut: Future<Output = (u16, String)>,
{
    let mut reader = BufReader::new(socket);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let (name, value) = (name.trim().to_string(), value.trim().to_string());
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((name, value));
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;

    let (status, body) = f(RecordedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
    .await;

    let status_text = match status {
        200 => "200 OK",
        201 => "201 Created",
        400 => "400 Bad Request",
        404 => "404 Not Found",
        409 => "409 Conflict",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let mut socket = reader.into_inner();
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

/// Config tuned for fast tests: short backoff, one supplier name.
pub fn test_config() -> BffConfig {
    let mut config = BffConfig::default();
    config.supplier.name = "hotelbeds".into();
    config.supplier.timeout_ms = 1000;
    config.retries.base_delay_ms = 5;
    config.retries.max_delay_ms = 50;
    config
}

pub fn live_upstream(config: &BffConfig, supplier_addr: SocketAddr) -> Upstream {
    Upstream::Live(Arc::new(HttpSupplier::new(
        config.supplier.name.clone(),
        reqwest::Client::builder().no_proxy().build().unwrap(),
        &format!("http://{}", supplier_addr),
        "test-key",
        Arc::new(ApiKeySigner::new("test-key", "test-secret")),
        Duration::from_millis(config.supplier.timeout_ms),
    )))
}

/// A BFF instance bound to an ephemeral port.
pub struct TestBff {
    pub addr: SocketAddr,
    pub store: Arc<MemoryCacheStore>,
    pub shutdown: Shutdown,
}

impl TestBff {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestBff {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_bff(config: BffConfig, upstream: Upstream) -> TestBff {
    start_bff_with_store(config, upstream, Arc::new(MemoryCacheStore::new())).await
}

pub async fn start_bff_with_store(
    config: BffConfig,
    upstream: Upstream,
    store: Arc<MemoryCacheStore>,
) -> TestBff {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::with_parts(config, store.clone() as Arc<dyn CacheStore>, upstream);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestBff {
        addr,
        store,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
