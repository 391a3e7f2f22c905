//! Async line-delimited JSON-RPC client for the instrumentation driver.
//!
//! The [`DriverClient`] owns two background tasks over an already-established
//! byte stream: a writer draining an mpsc channel of request lines, and a
//! reader routing response lines back to callers through the
//! [`RequestTracker`].
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                     DriverClient                        │
//! │                                                         │
//! │  apps()/ps()/… ──line──▶ write task ──▶ stream          │
//! │        ▲                                                │
//! │        └── oneshot ◀── RequestTracker ◀── read task ◀── │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Spawning, authenticating, or keeping the driver process alive is the
//! caller's business; the client only speaks over the stream it is given.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use tscope_core::prelude::*;
use tscope_core::{App, ClassTree, Device, Process};

use crate::driver::Driver;
use crate::protocol::{parse_response, CallOutcome, DriverRequest, RequestTracker};

/// Default per-call timeout
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Depth of the outgoing line queue
const WRITE_QUEUE_DEPTH: usize = 64;

/// Client handle for a driver connection.
pub struct DriverClient {
    line_tx: mpsc::Sender<String>,
    tracker: Arc<RequestTracker>,
    alive: Arc<AtomicBool>,
    timeout: Duration,
}

impl std::fmt::Debug for DriverClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverClient")
            .field("alive", &self.alive.load(Ordering::SeqCst))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DriverClient {
    /// Start the reader/writer tasks over an established stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R, W>(reader: R, writer: W, timeout: Duration) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (line_tx, line_rx) = mpsc::channel(WRITE_QUEUE_DEPTH);
        let tracker = Arc::new(RequestTracker::new());
        let alive = Arc::new(AtomicBool::new(true));

        tokio::spawn(write_loop(writer, line_rx, tracker.clone(), alive.clone()));
        tokio::spawn(read_loop(reader, tracker.clone(), alive.clone()));

        Self {
            line_tx,
            tracker,
            alive,
            timeout,
        }
    }

    /// Connect to a driver listening on a TCP address.
    pub async fn connect_tcp(addr: &str, timeout: Duration) -> Result<Self> {
        info!("Connecting to driver at {}", addr);
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        Ok(Self::spawn(reader, writer, timeout))
    }

    /// A client that was never attached. Every call fails with
    /// [`Error::NotConnected`] and [`Driver::connected`] reports `false`.
    pub fn detached() -> Self {
        let (line_tx, _line_rx) = mpsc::channel(1);
        Self {
            line_tx,
            tracker: Arc::new(RequestTracker::new()),
            alive: Arc::new(AtomicBool::new(false)),
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Number of calls still waiting for a reply.
    pub async fn pending_calls(&self) -> usize {
        self.tracker.pending_count().await
    }

    /// Issue one call and wait for the driver's verdict.
    ///
    /// The outer `Result` is the transport outcome; the inner [`CallOutcome`]
    /// is what the driver answered.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<CallOutcome> {
        if !self.is_alive() {
            return Err(Error::NotConnected);
        }

        let (id, response_rx) = self.tracker.register(method).await;
        if !self.is_alive() {
            // The reader went away between the check and the registration.
            self.tracker.remove(id).await;
            return Err(Error::NotConnected);
        }

        let line = DriverRequest::new(id, method, params).to_line()?;
        debug!("Driver call #{}: {}", id, method);

        if self.line_tx.send(line).await.is_err() {
            self.tracker.remove(id).await;
            return Err(Error::channel_send("driver writer"));
        }

        match tokio::time::timeout(self.timeout, response_rx).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(_)) => Err(Error::ChannelClosed),
            Err(_) => {
                self.tracker.remove(id).await;
                warn!("Driver call #{} '{}' timed out", id, method);
                Err(Error::timeout(method, self.timeout))
            }
        }
    }

    /// Call a listing method; driver rejections become [`Error::Driver`].
    async fn listing<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        match self.call(method, params).await? {
            Ok(value) => decode(method, value),
            Err(message) => Err(Error::driver(message)),
        }
    }
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::protocol(format!("malformed '{}' result: {}", method, e)))
}

impl Driver for DriverClient {
    fn connected(&self) -> bool {
        self.is_alive()
    }

    async fn devices(&self) -> Result<Vec<Device>> {
        self.listing("devices", Vec::new()).await
    }

    async fn apps(&self, device_id: &str) -> Result<Vec<App>> {
        self.listing("apps", vec![json!(device_id)]).await
    }

    async fn ps(&self, device_id: &str) -> Result<Vec<Process>> {
        self.listing("ps", vec![json!(device_id)]).await
    }

    async fn classes(&self, device_id: &str, pid: u32) -> Result<ClassTree> {
        match self.call("classes", vec![json!(device_id), json!(pid)]).await? {
            Ok(value) => decode("classes", value),
            Err(message) => Err(Error::introspection(message)),
        }
    }
}

// ---------------------------------------------------------------------------
// Background tasks
// ---------------------------------------------------------------------------

async fn write_loop<W>(
    mut writer: W,
    mut line_rx: mpsc::Receiver<String>,
    tracker: Arc<RequestTracker>,
    alive: Arc<AtomicBool>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = line_rx.recv().await {
        line.push('\n');
        let written: std::io::Result<()> = async {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        }
        .await;

        if let Err(e) = written {
            warn!("Driver write failed: {}", e);
            alive.store(false, Ordering::SeqCst);
            tracker.cancel_all().await;
            break;
        }
    }
    trace!("Driver write loop finished");
}

async fn read_loop<R>(reader: R, tracker: Arc<RequestTracker>, alive: Arc<AtomicBool>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if let Some(response) = parse_response(&line) {
                    tracker.handle_response(response).await;
                }
            }
            Ok(None) => {
                info!("Driver closed the connection");
                break;
            }
            Err(e) => {
                warn!("Driver read failed: {}", e);
                break;
            }
        }
    }

    alive.store(false, Ordering::SeqCst);
    tracker.cancel_all().await;
}
