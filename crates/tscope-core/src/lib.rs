//! # tscope-core - Core Domain Types
//!
//! Foundation crate for target-scope. Provides the target domain types, the
//! recursive class-tree type returned by introspection, error handling, and
//! logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, indexmap, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Device`] - A physical or virtual device the driver can reach
//! - [`DeviceKind`] - Device category (local, remote, USB)
//! - [`App`] - An installed application, possibly running
//! - [`Process`] - A running process
//! - [`ProviderMode`] - Which listing a device expands into (apps or processes)
//!
//! ### Class Tree (`class_tree`)
//! - [`ClassNode`] - A namespace or a terminal class
//! - [`ClassTree`] - One level of namespace entries, in backend order
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use tscope_core::prelude::*;
//! ```

pub mod class_tree;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use class_tree::{tree_depth, ClassNode, ClassTree};
pub use error::{Error, Result, ResultExt};
pub use types::{App, Device, DeviceKind, Process, ProviderMode};
