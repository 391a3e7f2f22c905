//! Transport contract consumed by the tree model
//!
//! The tree never talks to the wire directly. It asks a [`Driver`] for the
//! device list, per-device app/process listings, and per-process class trees.
//! [`DriverClient`](crate::DriverClient) is the production implementation;
//! tests use [`FakeDriver`](crate::test_utils::FakeDriver).

use tscope_core::prelude::*;
use tscope_core::{App, ClassTree, Device, Process};

/// Remote calls exposed by the instrumentation driver.
///
/// Implementors normally implement the `Send` variant, [`Driver`]; the blanket
/// impl makes every `Driver` a `LocalDriver` too.
#[trait_variant::make(Driver: Send)]
pub trait LocalDriver {
    /// Synchronous liveness check. No side effects.
    fn connected(&self) -> bool;

    /// List every device the driver can reach.
    async fn devices(&self) -> Result<Vec<Device>>;

    /// List installed applications on a device.
    async fn apps(&self, device_id: &str) -> Result<Vec<App>>;

    /// List running processes on a device.
    async fn ps(&self, device_id: &str) -> Result<Vec<Process>>;

    /// Fetch the complete class hierarchy of a live process.
    async fn classes(&self, device_id: &str, pid: u32) -> Result<ClassTree>;
}
