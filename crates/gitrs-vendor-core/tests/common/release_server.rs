//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves one static body for every GET with a configurable status. Counts
//! requests so tests can assert how often the installer hit the network.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Status code returned for GET (with the body).
    pub status: u16,
    /// Number of initial requests answered with 503 before `status` is used.
    pub fail_first: usize,
    /// Send 200 headers and a few body bytes, then hold the connection open
    /// without sending more.
    pub stall: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            fail_first: 0,
            stall: false,
        }
    }
}

pub struct ReleaseServer {
    /// Base URL without trailing slash, e.g. "http://127.0.0.1:12345".
    pub base_url: String,
    requests: Arc<AtomicUsize>,
    last_path: Arc<Mutex<Option<String>>>,
}

impl ReleaseServer {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Request path of the most recent GET, e.g. "/releases/download/0.1.1/x.zip".
    pub fn last_path(&self) -> Option<String> {
        self.last_path.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread serving `body` with 200 OK.
pub fn start(body: Vec<u8>) -> ReleaseServer {
    start_with_options(body, ServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: ServerOptions) -> ReleaseServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(AtomicUsize::new(0));
    let last_path = Arc::new(Mutex::new(None));
    let counter = Arc::clone(&requests);
    let path_slot = Arc::clone(&last_path);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let status = if n < opts.fail_first { 503 } else { opts.status };
            let body = Arc::clone(&body);
            let path_slot = Arc::clone(&path_slot);
            if opts.stall {
                thread::spawn(move || stall(stream, &body));
            } else {
                thread::spawn(move || handle(stream, &body, status, &path_slot));
            }
        }
    });
    ReleaseServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
        last_path,
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    status: u16,
    last_path: &Mutex<Option<String>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    if let Some(path) = request.lines().next().and_then(|l| l.split_whitespace().nth(1)) {
        *last_path.lock().unwrap() = Some(path.to_string());
    }
    let payload: &[u8] = if status == 200 {
        body
    } else {
        b"<html><body>error page</body></html>"
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        payload.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(payload);
}

const STALL_FOR: Duration = Duration::from_secs(15);

fn stall(mut stream: std::net::TcpStream, body: &[u8]) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    if matches!(stream.read(&mut buf), Ok(0) | Err(_)) {
        return;
    }
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&body[..body.len().min(16)]);
    let _ = stream.flush();
    thread::sleep(STALL_FOR);
}
