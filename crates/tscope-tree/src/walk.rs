//! Depth-limited tree walk
//!
//! Drives a [`DevicesProvider`] the way a host would: query the root, then
//! expand each node in turn until `max_depth` levels are materialized. A
//! rejected expansion is recorded on that node and the walk carries on with
//! its siblings.

use std::fmt::Write as _;

use serde::Serialize;

use tscope_core::prelude::*;
use tscope_driver::Driver;

use crate::facets::TreeItem;
use crate::item::{ItemKind, TargetItem};
use crate::provider::DevicesProvider;

/// One walked node: its facets and whatever its expansion produced.
#[derive(Debug, Clone, Serialize)]
pub struct TreeSnapshot {
    pub kind: ItemKind,
    #[serde(flatten)]
    pub item: TreeItem,
    /// Message of a rejected expansion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeSnapshot>,
}

/// Walk the tree from the root, materializing at most `max_depth` levels.
///
/// `max_depth == 1` returns the device list without expanding any device.
/// A failing root query fails the walk.
pub async fn walk<D: Driver>(
    provider: &DevicesProvider<D>,
    max_depth: usize,
) -> Result<Vec<TreeSnapshot>> {
    if max_depth == 0 {
        return Ok(Vec::new());
    }

    let roots = provider.get_children(None).await?;
    let mut snapshots = Vec::with_capacity(roots.len());
    for root in &roots {
        snapshots.push(walk_item(provider, root, 1, max_depth).await);
    }
    Ok(snapshots)
}

async fn walk_item<D: Driver>(
    provider: &DevicesProvider<D>,
    item: &TargetItem,
    depth: usize,
    max_depth: usize,
) -> TreeSnapshot {
    let mut snapshot = TreeSnapshot {
        kind: item.kind(),
        item: provider.tree_item(item),
        error: None,
        children: Vec::new(),
    };

    if depth >= max_depth {
        return snapshot;
    }

    match provider.get_children(Some(item)).await {
        Ok(children) => {
            for child in &children {
                let walked = Box::pin(walk_item(provider, child, depth + 1, max_depth)).await;
                snapshot.children.push(walked);
            }
        }
        Err(e) => {
            debug!("Expanding '{}' failed: {}", item.label(), e);
            snapshot.error = Some(e.reason());
        }
    }

    snapshot
}

/// Render snapshots as an indented outline, two spaces per level.
///
/// ```text
/// iPhone  usb1
///   Example  com.example
///     ! process detached
/// ```
pub fn render_text(snapshots: &[TreeSnapshot]) -> String {
    let mut out = String::new();
    for snapshot in snapshots {
        render_into(&mut out, snapshot, 0);
    }
    out
}

fn render_into(out: &mut String, snapshot: &TreeSnapshot, level: usize) {
    let indent = "  ".repeat(level);
    match &snapshot.item.description {
        Some(description) => {
            let _ = writeln!(out, "{}{}  {}", indent, snapshot.item.label, description);
        }
        None => {
            let _ = writeln!(out, "{}{}", indent, snapshot.item.label);
        }
    }

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "{}  ! {}", indent, error);
    }

    for child in &snapshot.children {
        render_into(out, child, level + 1);
    }
}
