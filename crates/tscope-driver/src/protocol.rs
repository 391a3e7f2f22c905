//! Line-delimited JSON-RPC framing and request tracking
//!
//! Every frame is one JSON object terminated by `\n`.
//!
//! ```text
//! → {"id":7,"method":"apps","params":["usb1"]}
//! ← {"id":7,"result":[{"identifier":"com.example","name":"Example","pid":0}]}
//! ← {"id":8,"error":{"message":"device offline"}}
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{oneshot, RwLock};

use tscope_core::prelude::*;

/// Global request ID counter
static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique request ID
pub fn next_request_id() -> u64 {
    REQUEST_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Outgoing call.
#[derive(Debug, Serialize)]
pub struct DriverRequest {
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl DriverRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }

    /// Serialize to a single wire line (without the trailing newline).
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Incoming reply to a [`DriverRequest`].
#[derive(Debug, Deserialize)]
pub struct DriverResponse {
    pub id: u64,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<DriverError>,
}

/// Error object carried by a failed reply.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverError {
    pub message: String,
}

/// Outcome of one call as delivered to the waiting caller.
///
/// `Err` holds the driver's own message; the client maps it onto the
/// appropriate [`Error`] variant for the method.
pub type CallOutcome = std::result::Result<Value, String>;

impl DriverResponse {
    pub fn into_outcome(self) -> CallOutcome {
        match (self.error, self.result) {
            (Some(err), _) => Err(err.message),
            (None, Some(result)) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }
}

/// Parse one line received from the driver.
///
/// Returns `None` for blank lines and for anything that is not a response frame.
pub fn parse_response(line: &str) -> Option<DriverResponse> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<DriverResponse>(trimmed) {
        Ok(response) => Some(response),
        Err(e) => {
            warn!("Ignoring unparseable driver frame ({}): {}", e, trimmed);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Request tracking
// ---------------------------------------------------------------------------

/// A pending request awaiting response
struct PendingRequest {
    response_tx: oneshot::Sender<CallOutcome>,
    created_at: Instant,
    method: String,
}

/// Tracks pending requests and matches responses
#[derive(Default)]
pub struct RequestTracker {
    pending: Arc<RwLock<HashMap<u64, PendingRequest>>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending request
    /// Returns (request_id, receiver for response)
    pub async fn register(&self, method: &str) -> (u64, oneshot::Receiver<CallOutcome>) {
        let id = next_request_id();
        let (tx, rx) = oneshot::channel();

        let pending = PendingRequest {
            response_tx: tx,
            created_at: Instant::now(),
            method: method.to_string(),
        };

        self.pending.write().await.insert(id, pending);

        (id, rx)
    }

    /// Route an incoming response to its caller.
    /// Returns true if the response was matched to a pending request
    pub async fn handle_response(&self, response: DriverResponse) -> bool {
        let id = response.id;
        if let Some(pending) = self.pending.write().await.remove(&id) {
            trace!(
                "Driver call #{} '{}' answered after {:?}",
                id,
                pending.method,
                pending.created_at.elapsed()
            );
            let _ = pending.response_tx.send(response.into_outcome());
            true
        } else {
            debug!("Driver response #{} has no pending request", id);
            false
        }
    }

    /// Forget a request whose caller stopped waiting.
    pub async fn remove(&self, id: u64) -> bool {
        self.pending.write().await.remove(&id).is_some()
    }

    /// Drop every pending request; their receivers observe a closed channel.
    pub async fn cancel_all(&self) {
        let mut pending = self.pending.write().await;
        if !pending.is_empty() {
            debug!("Cancelling {} pending driver calls", pending.len());
        }
        pending.clear();
    }

    /// Get the number of pending requests
    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }
}
