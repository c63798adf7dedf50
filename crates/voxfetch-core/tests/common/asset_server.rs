//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves one static body for every GET path. Can answer with an error
//! status, delay the response, throttle the body, or stall mid-body.
//! Counts GET requests so tests can assert how many fetches happened.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct AssetServerOptions {
    /// Status code of every GET response (200 = serve the body).
    pub status: u16,
    /// Sleep before sending the response headers.
    pub respond_delay: Option<Duration>,
    /// Send the body in 1 KiB pieces with this pause between them.
    pub piece_delay: Option<Duration>,
    /// Send only this many body bytes, then go silent for `stall_for`.
    pub stall_after: Option<usize>,
    pub stall_for: Duration,
}

impl Default for AssetServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            respond_delay: None,
            piece_delay: None,
            stall_after: None,
            stall_for: Duration::from_secs(5),
        }
    }
}

pub struct AssetServer {
    base: String,
    hits: Arc<AtomicUsize>,
}

impl AssetServer {
    /// URL of `name` on this server.
    pub fn url(&self, name: &str) -> String {
        format!("{}{}", self.base, name)
    }

    /// GET requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn start(body: Vec<u8>) -> AssetServer {
    start_with_options(body, AssetServerOptions::default())
}

/// Starts a server in a background thread serving `body`. The server runs
/// until the process exits.
pub fn start_with_options(body: Vec<u8>, opts: AssetServerOptions) -> AssetServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let counter = Arc::clone(&counter);
            thread::spawn(move || handle(stream, &body, opts, &counter));
        }
    });
    AssetServer {
        base: format!("http://127.0.0.1:{}/", port),
        hits,
    }
}

/// A URL on a port nobody listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/model.onnx", port)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn handle(mut stream: TcpStream, body: &[u8], opts: AssetServerOptions, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(10)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let method = request.split_whitespace().next().unwrap_or("");
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    hits.fetch_add(1, Ordering::SeqCst);

    if let Some(d) = opts.respond_delay {
        thread::sleep(d);
    }
    if opts.status != 200 {
        let msg = reason(opts.status);
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            opts.status,
            msg,
            msg.len(),
            msg
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        body.len()
    );
    if stream.write_all(header.as_bytes()).is_err() {
        return;
    }

    let sent = match opts.stall_after {
        Some(limit) => &body[..limit.min(body.len())],
        None => body,
    };
    match opts.piece_delay {
        Some(d) => {
            for piece in sent.chunks(1024) {
                if stream.write_all(piece).is_err() {
                    return;
                }
                let _ = stream.flush();
                thread::sleep(d);
            }
        }
        None => {
            let _ = stream.write_all(sent);
        }
    }
    let _ = stream.flush();
    if opts.stall_after.is_some() {
        thread::sleep(opts.stall_for);
    }
}
