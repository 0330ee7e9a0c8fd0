use std::io;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use taxi_fleet_server::{build_router, AppState};
use taxi_fleet_store::FleetStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter(Arc::clone(&self.0))
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn json_lines(&self) -> Vec<Value> {
        let bytes = self.0.lock().expect("lock output").clone();
        String::from_utf8(bytes)
            .expect("utf8 log output")
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("json log line"))
            .collect()
    }
}

#[tokio::test]
async fn request_completion_is_logged_inside_request_span() {
    let sink = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = Arc::new(FleetStore::open_in_memory().expect("store"));
    let app = build_router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let req = format!(
        "GET /cars/7/ HTTP/1.1\r\nHost: {addr}\r\nx-request-id: req-log-1\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(req.as_bytes()).await.expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    assert!(response.starts_with("HTTP/1.1 401"));

    let lines = sink.json_lines();
    let completed = lines
        .iter()
        .find(|l| l.pointer("/fields/message").and_then(Value::as_str) == Some("request completed"))
        .expect("completion event");
    assert_eq!(completed.pointer("/fields/status"), Some(&serde_json::json!(401)));
    assert_eq!(
        completed.pointer("/span/request_id").and_then(Value::as_str),
        Some("req-log-1")
    );
    assert_eq!(
        completed.pointer("/span/route").and_then(Value::as_str),
        Some("/cars/7/")
    );

    let failed = lines
        .iter()
        .find(|l| l.pointer("/fields/message").and_then(Value::as_str) == Some("request failed"))
        .expect("failure event");
    assert_eq!(
        failed.pointer("/fields/code").and_then(Value::as_str),
        Some("Unauthorized")
    );
}
