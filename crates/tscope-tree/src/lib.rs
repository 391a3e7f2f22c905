//! # tscope-tree - Lazy Target Tree
//!
//! The view model a host tree widget renders: devices at the root, their apps
//! or processes below, and the runtime class hierarchy below a running app or
//! process. Children are computed on demand, one level per expansion.
//!
//! ```text
//! Device ──▶ App | Process ──▶ Namespace ──▶ … ──▶ Class
//!    └──▶ error leaf (listing failed)
//! ```
//!
//! ## Public API
//!
//! ### Provider (`provider`)
//! - [`DevicesProvider`] - Root query, delegation, refresh notifications
//!
//! ### Nodes (`item`, `hierarchy`)
//! - [`TargetItem`] - Closed set of node kinds with a single `children` operation
//! - [`DeviceItem`], [`AppItem`], [`ProcessItem`], [`NotFoundItem`]
//! - [`HierarchyItem`] - Namespace/class nodes; `expand` decodes one level
//!
//! ### Display (`facets`)
//! - [`TreeItem`] - Label, tooltip, description, icon, command, context tag
//! - [`Resources`] - Light/dark icon resolution
//!
//! ### Walking (`walk`)
//! - [`walk()`] - Depth-limited expansion into [`TreeSnapshot`]s
//! - [`render_text()`] - Indented outline
//!
//! ### Settings (`config`)
//! - [`load_settings()`], [`save_settings()`], [`Settings`]

pub mod config;
pub mod facets;
pub mod hierarchy;
pub mod item;
pub mod provider;
pub mod walk;

pub use config::{config_path, load_settings, save_settings, Settings};
pub use facets::{
    Collapsible, ContextValue, Icon, ItemCommand, Resources, Theme, TreeItem, INSPECT_COMMAND,
};
pub use hierarchy::HierarchyItem;
pub use item::{AppItem, DeviceItem, ItemKind, NotFoundItem, ProcessItem, TargetItem};
pub use provider::DevicesProvider;
pub use walk::{render_text, walk, TreeSnapshot};
