//! Mock proxies for integration tests.

#![allow(dead_code)]

use proxy_harvest::Candidate;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Where a mock proxy sends 3xx replies
pub const REDIRECT_TARGET: &str = "http://captive-portal.test/login";

/// How a mock proxy answers
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Reply with this status after the delay
    Respond { status: u16, delay: Duration },
    /// Accept and never answer
    Hang,
}

impl Behavior {
    pub fn ok(delay_ms: u64) -> Self {
        Behavior::Respond {
            status: 200,
            delay: Duration::from_millis(delay_ms),
        }
    }
}

/// Connection counters shared by one or more mock proxies
#[derive(Debug, Default)]
pub struct Gauge {
    pub in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub requests: AtomicUsize,
}

impl Gauge {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Start a mock proxy on an ephemeral port and return it as a candidate.
pub async fn start_mock_proxy(behavior: Behavior, gauge: Arc<Gauge>) -> Candidate {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let gauge = gauge.clone();
                    tokio::spawn(async move { serve(socket, behavior, gauge).await });
                }
                Err(_) => break,
            }
        }
    });

    candidate(addr)
}

/// A candidate whose port refuses connections.
pub async fn refused_candidate() -> Candidate {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    candidate(addr)
}

fn candidate(addr: SocketAddr) -> Candidate {
    Candidate::new(addr.ip().to_string(), addr.port())
}

async fn serve(mut socket: TcpStream, behavior: Behavior, gauge: Arc<Gauge>) {
    read_request(&mut socket).await;
    gauge.requests.fetch_add(1, Ordering::SeqCst);

    let now = gauge.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    gauge.peak.fetch_max(now, Ordering::SeqCst);

    match behavior {
        Behavior::Respond { status, delay } => {
            tokio::time::sleep(delay).await;
            let body = "{\"origin\": \"127.0.0.1\"}";
            let location = if (300..400).contains(&status) {
                format!("Location: {}\r\n", REDIRECT_TARGET)
            } else {
                String::new()
            };
            let response = format!(
                "HTTP/1.1 {} {}\r\n{}Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason_phrase(status),
                location,
                body.len(),
                body
            );
            gauge.in_flight.fetch_sub(1, Ordering::SeqCst);
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        Behavior::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            gauge.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        403 => "Forbidden",
        407 => "Proxy Authentication Required",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Serve a fixed page on an ephemeral port and return its URL.
pub async fn start_mock_page(status: u16, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = Arc::new(body);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason_phrase(status),
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}/list", addr)
}
