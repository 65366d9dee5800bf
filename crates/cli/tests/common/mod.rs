//! Shared helpers for the hvlink integration tests.

#![allow(dead_code)]

use std::io::Read;
use std::net::TcpStream;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Base port is derived from the process ID so parallel test binaries
/// don't collide on the same range.
static NEXT_PORT: AtomicU16 = AtomicU16::new(0);
static PORT_INIT: std::sync::Once = std::sync::Once::new();

pub fn next_port() -> u16 {
    PORT_INIT.call_once(|| {
        let base = 20000 + (std::process::id() as u16 % 20000);
        NEXT_PORT.store(base, Ordering::SeqCst);
    });
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// Kills the wrapped child process on drop.
pub struct ChildGuard(pub Child);

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.0.kill().ok();
        self.0.wait().ok();
    }
}

/// Start `hvlink mock-hv` on `port` and wait until it accepts connections.
pub fn start_mock_hv(port: u16) -> ChildGuard {
    let child = Command::new(env!("CARGO_BIN_EXE_hvlink"))
        .arg("mock-hv")
        .arg("--port")
        .arg(port.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start hvlink mock-hv");
    for _ in 0..50 {
        if TcpStream::connect(format!("127.0.0.1:{}", port)).is_ok() {
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    ChildGuard(child)
}

/// Plain HTTP/1.1 GET returning (status, body).
pub fn http_get(port: u16, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port)).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost:{}\r\nConnection: close\r\n\r\n",
        path, port
    );
    std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);

    let status = response
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_default();
    (status, body)
}

/// Everything the PIK stub has received.
#[derive(Default)]
pub struct PikLog {
    pub events: Vec<Value>,
    pub user_queries: usize,
}

/// In-process PIK stub: accepts every ingest, lists one user.
/// Returns its base URL and the shared log.
pub fn start_pik_stub() -> (String, Arc<Mutex<PikLog>>) {
    let log = Arc::new(Mutex::new(PikLog::default()));
    let router = Router::new()
        .route(
            "/api/ingest",
            post(
                |State(log): State<Arc<Mutex<PikLog>>>, Json(body): Json<Value>| async move {
                    log.lock().unwrap().events.push(body);
                    Json(json!({"status": "ok", "data": {"changes_applied": {
                        "session_xp": 100, "boss_bonus_xp": 20, "node_xp": 5
                    }}}))
                },
            ),
        )
        .route(
            "/api/users",
            get(|State(log): State<Arc<Mutex<PikLog>>>| async move {
                log.lock().unwrap().user_queries += 1;
                Json(json!({"status": "ok", "data": [
                    {"root_id": "pik-root-demo-operator-001", "auth_handle": "demo-player-001"}
                ]}))
            }),
        )
        .with_state(log.clone());

    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind");
            tx.send(listener.local_addr().expect("addr")).expect("send addr");
            axum::serve(listener, router).await.expect("serve");
        });
    });
    let addr = rx.recv().expect("stub address");
    (format!("http://{}", addr), log)
}

/// A base URL on which nothing listens.
pub fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
