//! Endpoint lifecycle and per-connection I/O.
//!
//! `CommandServer::start` binds the named endpoint and returns two
//! halves: a [`ServerHandle`] for shutdown, and the [`UiTaskQueue`] the
//! hosting application drains on its UI thread. Each accepted client
//! gets its own thread and receive buffer; requests are only executed
//! once a complete message has been framed.

use std::io::Read;
use std::io::Write;
use std::os::unix::net::UnixListener;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use crossbeam_channel::Sender;
use tracing::debug;
use tracing::info;
use tracing::warn;

use gip_ipc::decode;
use gip_ipc::encode_response;
use gip_ipc::endpoint_path;
use gip_ipc::Decoded;
use gip_ipc::Response;
use gip_ipc::WireMessage;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::queue::UiTask;
use crate::queue::UiTaskQueue;

const ACCEPT_POLL: Duration = Duration::from_millis(50);
// Read in short slices so shutdown and idle checks stay responsive.
const READ_SLICE: Duration = Duration::from_secs(1);
const REPLY_WAIT: Duration = Duration::from_secs(30);
const STOP_DRAIN: Duration = Duration::from_secs(2);
const READ_CHUNK: usize = 4096;

pub struct CommandServer;

impl CommandServer {
    /// Start serving on the endpoint derived from `name`. A stale
    /// endpoint file left by a crashed process is removed first; a live
    /// conflicting server will lose its endpoint, which is the accepted
    /// trade-off for always being restartable.
    pub fn start(name: &str) -> Result<(ServerHandle, UiTaskQueue), ServerError> {
        Self::start_with_config(name, ServerConfig::default())
    }

    pub fn start_with_config(
        name: &str,
        config: ServerConfig,
    ) -> Result<(ServerHandle, UiTaskQueue), ServerError> {
        let endpoint = endpoint_path(name);

        if endpoint.exists() {
            warn!(endpoint = %endpoint.display(), "removing stale endpoint");
            std::fs::remove_file(&endpoint).map_err(|source| ServerError::StaleEndpoint {
                path: endpoint.clone(),
                source,
            })?;
        }

        let listener = UnixListener::bind(&endpoint).map_err(|source| ServerError::Bind {
            path: endpoint.clone(),
            source,
        })?;
        listener
            .set_nonblocking(true)
            .map_err(|source| ServerError::Bind {
                path: endpoint.clone(),
                source,
            })?;

        let (task_tx, task_rx) = crossbeam_channel::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let active = Arc::new(AtomicUsize::new(0));

        let accept_thread = {
            let shutdown = Arc::clone(&shutdown);
            let active = Arc::clone(&active);
            thread::Builder::new()
                .name("gip-accept".to_string())
                .spawn(move || accept_loop(listener, task_tx, config, shutdown, active))
                .map_err(ServerError::Spawn)?
        };

        info!(endpoint = %endpoint.display(), "command server listening");
        Ok((
            ServerHandle {
                shutdown,
                accept_thread: Some(accept_thread),
                active,
                endpoint,
            },
            UiTaskQueue::new(task_rx),
        ))
    }
}

pub struct ServerHandle {
    shutdown: Arc<AtomicBool>,
    accept_thread: Option<thread::JoinHandle<()>>,
    active: Arc<AtomicUsize>,
    endpoint: PathBuf,
}

impl ServerHandle {
    pub fn endpoint(&self) -> &Path {
        &self.endpoint
    }

    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Stop accepting, let in-flight connections wind down, remove the
    /// endpoint file.
    pub fn stop(self) {
        // Drop runs the actual shutdown.
    }

    fn shut_down(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.accept_thread.take() {
            let _ = handle.join();
        }
        let deadline = Instant::now() + STOP_DRAIN;
        while self.active.load(Ordering::Relaxed) > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
        let _ = std::fs::remove_file(&self.endpoint);
        info!(endpoint = %self.endpoint.display(), "command server stopped");
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shut_down();
    }
}

fn accept_loop(
    listener: UnixListener,
    tasks: Sender<UiTask>,
    config: ServerConfig,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
) {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        let stream = match listener.accept() {
            Ok((stream, _)) => stream,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
                continue;
            }
            Err(e) => {
                warn!(error = %e, "accept failed");
                thread::sleep(ACCEPT_POLL);
                continue;
            }
        };

        if active.load(Ordering::Relaxed) >= config.max_connections {
            warn!(max = config.max_connections, "connection limit reached");
            let response = Response::failure(0, "too many connections");
            let _ = write_response(&stream, &response);
            continue;
        }

        let slot = ConnectionSlot::claim(Arc::clone(&active));
        let tasks = tasks.clone();
        let config = config.clone();
        let shutdown = Arc::clone(&shutdown);
        let spawned = thread::Builder::new()
            .name("gip-conn".to_string())
            .spawn(move || {
                let _slot = slot;
                handle_connection(stream, tasks, config, shutdown);
            });
        if let Err(e) = spawned {
            // The slot moved into the failed closure and is already
            // released by the drop.
            warn!(error = %e, "failed to spawn connection thread");
        }
    }
}

/// One entry in the active-connection count, released on drop so the
/// slot comes back whether the connection thread ran or never started.
struct ConnectionSlot {
    active: Arc<AtomicUsize>,
}

impl ConnectionSlot {
    fn claim(active: Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::Relaxed);
        Self { active }
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
    }
}

fn handle_connection(
    mut stream: UnixStream,
    tasks: Sender<UiTask>,
    config: ServerConfig,
    shutdown: Arc<AtomicBool>,
) {
    if let Err(e) = stream.set_read_timeout(Some(READ_SLICE)) {
        warn!(error = %e, "failed to set read timeout");
        return;
    }

    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    let mut last_activity = Instant::now();

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("closing connection on shutdown");
            return;
        }
        if last_activity.elapsed() > config.idle_timeout {
            debug!("closing idle connection");
            return;
        }

        match stream.read(&mut chunk) {
            Ok(0) => {
                debug!("peer closed connection");
                return;
            }
            Ok(n) => {
                buffer.extend_from_slice(&chunk[..n]);
                last_activity = Instant::now();
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(e) => {
                warn!(error = %e, "connection read error");
                return;
            }
        }

        if !drain_messages(&mut stream, &mut buffer, &tasks) {
            return;
        }

        if buffer.len() > config.max_request_bytes {
            let response = Response::failure(
                0,
                &format!(
                    "Parse error: request size limit exceeded ({} bytes max)",
                    config.max_request_bytes
                ),
            );
            let _ = write_response(&stream, &response);
            return;
        }
    }
}

/// Execute every complete message currently in `buffer`. Returns false
/// when the connection must be dropped.
fn drain_messages(stream: &mut UnixStream, buffer: &mut Vec<u8>, tasks: &Sender<UiTask>) -> bool {
    loop {
        match decode(buffer) {
            Ok(Decoded::Incomplete) => return true,

            Ok(Decoded::Message { message, consumed }) => {
                buffer.drain(..consumed);
                match message {
                    WireMessage::Request(request) => {
                        let Some(response) = execute(tasks, request) else {
                            return false;
                        };
                        if let Err(e) = write_response(stream, &response) {
                            debug!(error = %e, "response write failed");
                            return false;
                        }
                    }
                    WireMessage::Response(response) => {
                        // Clients have no business sending responses.
                        let reply =
                            Response::failure(response.id, "expected a request envelope");
                        if write_response(stream, &reply).is_err() {
                            return false;
                        }
                    }
                }
            }

            Err(e) => {
                // No framing, so there is no resync point after garbage;
                // report once and drop the connection.
                warn!(error = %e, "malformed request");
                let response = Response::failure(0, &format!("Parse error: {}", e));
                let _ = write_response(stream, &response);
                return false;
            }
        }
    }
}

/// Hand one request to the UI thread and wait for its response. `None`
/// means the queue is gone or stuck and the connection should close.
fn execute(tasks: &Sender<UiTask>, request: gip_ipc::Request) -> Option<Response> {
    let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
    let task = UiTask {
        request,
        reply: reply_tx,
    };
    if tasks.send(task).is_err() {
        debug!("task queue dropped; closing connection");
        return None;
    }
    match reply_rx.recv_timeout(REPLY_WAIT) {
        Ok(response) => Some(response),
        Err(e) => {
            warn!(error = %e, "no response from ui thread");
            None
        }
    }
}

fn write_response(mut stream: &UnixStream, response: &Response) -> std::io::Result<()> {
    let bytes = encode_response(response)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    stream.write_all(&bytes)?;
    stream.flush()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU64;

    use super::*;
    use crate::test_support::MockBackend;

    static NEXT_NAME: AtomicU64 = AtomicU64::new(0);

    fn unique_name() -> String {
        format!(
            "gip-server-test-{}-{}",
            std::process::id(),
            NEXT_NAME.fetch_add(1, Ordering::Relaxed)
        )
    }

    fn spawn_pump(queue: UiTaskQueue, stop: Arc<AtomicBool>) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let mut backend = MockBackend::form_app();
            while !stop.load(Ordering::Relaxed) {
                queue.process_one(&mut backend, Duration::from_millis(20));
            }
        })
    }

    #[test]
    fn test_connection_slot_released_even_if_thread_never_runs() {
        let active = Arc::new(AtomicUsize::new(0));

        let slot = ConnectionSlot::claim(Arc::clone(&active));
        assert_eq!(active.load(Ordering::Relaxed), 1);

        // A spawn failure drops the unexecuted closure along with the
        // slot it captured.
        let closure = move || {
            let _slot = slot;
        };
        drop(closure);
        assert_eq!(active.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_start_creates_and_stop_removes_endpoint() {
        let name = unique_name();
        let (handle, _queue) = CommandServer::start(&name).unwrap();
        let endpoint = handle.endpoint().to_path_buf();
        assert!(endpoint.exists());
        handle.stop();
        assert!(!endpoint.exists());
    }

    #[test]
    fn test_start_replaces_stale_endpoint() {
        let name = unique_name();
        let stale = endpoint_path(&name);
        std::fs::write(&stale, b"").unwrap();

        let (handle, _queue) = CommandServer::start(&name).unwrap();
        assert!(handle.endpoint().exists());
        handle.stop();
    }

    #[test]
    fn test_ping_round_trip_over_socket() {
        let name = unique_name();
        let (handle, queue) = CommandServer::start(&name).unwrap();
        let stop = Arc::new(AtomicBool::new(false));
        let pump = spawn_pump(queue, Arc::clone(&stop));

        let mut stream = UnixStream::connect(handle.endpoint()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        stream
            .write_all(br#"{"id":1,"method":"ping","params":{}}"#)
            .unwrap();

        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];
        let response = loop {
            match decode(&buffer).unwrap() {
                Decoded::Message {
                    message: WireMessage::Response(response),
                    ..
                } => break response,
                _ => {
                    let n = stream.read(&mut chunk).unwrap();
                    assert!(n > 0, "server closed before responding");
                    buffer.extend_from_slice(&chunk[..n]);
                }
            }
        };
        assert_eq!(response.id, 1);
        assert_eq!(
            response.result.unwrap()["status"],
            serde_json::json!("ok")
        );

        stop.store(true, Ordering::Relaxed);
        pump.join().unwrap();
        handle.stop();
    }

    #[test]
    fn test_garbage_input_gets_parse_error_then_close() {
        let name = unique_name();
        let (handle, queue) = CommandServer::start(&name).unwrap();
        let stop = Arc::new(AtomicBool::new(false));
        let pump = spawn_pump(queue, Arc::clone(&stop));

        let mut stream = UnixStream::connect(handle.endpoint()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        stream.write_all(b"this is not json").unwrap();

        let mut reply = Vec::new();
        stream.read_to_end(&mut reply).unwrap();
        let text = String::from_utf8(reply).unwrap();
        assert!(text.contains("Parse error"));

        stop.store(true, Ordering::Relaxed);
        pump.join().unwrap();
        handle.stop();
    }

    #[test]
    fn test_oversized_request_is_rejected() {
        let name = unique_name();
        let config = ServerConfig::from_env().with_max_request_bytes(64);
        let (handle, queue) = CommandServer::start_with_config(&name, config).unwrap();
        let stop = Arc::new(AtomicBool::new(false));
        let pump = spawn_pump(queue, Arc::clone(&stop));

        let mut stream = UnixStream::connect(handle.endpoint()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        // An unterminated object bigger than the limit.
        let mut payload = br#"{"id":1,"method":"type","params":{"text":""#.to_vec();
        payload.extend_from_slice(&[b'a'; 128]);
        stream.write_all(&payload).unwrap();

        let mut reply = Vec::new();
        stream.read_to_end(&mut reply).unwrap();
        let text = String::from_utf8(reply).unwrap();
        assert!(text.contains("request size limit exceeded"));

        stop.store(true, Ordering::Relaxed);
        pump.join().unwrap();
        handle.stop();
    }
}
