//! # tscope-driver - Driver Transport
//!
//! The contract the tree model consumes from the out-of-process
//! instrumentation driver, plus a line-delimited JSON-RPC client that speaks
//! it over any tokio byte stream.
//!
//! Depends on [`tscope_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Contract
//! - [`Driver`] / [`LocalDriver`] - `connected`, `devices`, `apps`, `ps`, `classes`
//!
//! ### Client
//! - [`DriverClient`] - Background reader/writer tasks with per-call timeouts
//! - [`RequestTracker`] - Correlates request ids with waiting callers
//! - [`DriverRequest`], [`DriverResponse`] - Wire frames
//!
//! ### Testing (`test-helpers` feature)
//! - `test_utils::FakeDriver` - Canned responses, records every call

pub mod client;
pub mod driver;
pub mod protocol;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

// Public API re-exports
pub use client::{DriverClient, DEFAULT_CALL_TIMEOUT};
pub use driver::{Driver, LocalDriver};
pub use protocol::{parse_response, DriverError, DriverRequest, DriverResponse, RequestTracker};
