//! Class-hierarchy nodes
//!
//! [`HierarchyItem::expand`] turns one level of a [`ClassTree`] into tree
//! nodes. It never recurses: each namespace node keeps its own subtree and
//! expands it only when the host asks for that node's children.

use tscope_core::{ClassNode, ClassTree};

use crate::facets::{Collapsible, TreeItem};
use crate::item::TargetItem;

/// A namespace segment or a concrete class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyItem {
    pub name: String,
    pub node: ClassNode,
}

impl HierarchyItem {
    pub fn new(name: impl Into<String>, node: ClassNode) -> Self {
        Self {
            name: name.into(),
            node,
        }
    }

    /// One node per entry, in the tree's order.
    pub fn expand(tree: ClassTree) -> Vec<TargetItem> {
        tree.into_iter()
            .map(|(name, node)| TargetItem::Hierarchy(HierarchyItem::new(name, node)))
            .collect()
    }

    pub fn children(&self) -> Vec<TargetItem> {
        match &self.node {
            ClassNode::Class => Vec::new(),
            ClassNode::Namespace(tree) => Self::expand(tree.clone()),
        }
    }

    pub fn tree_item(&self) -> TreeItem {
        let collapsible = if self.node.is_class() {
            Collapsible::None
        } else {
            Collapsible::Collapsed
        };
        TreeItem::new(self.name.clone(), collapsible)
    }
}
