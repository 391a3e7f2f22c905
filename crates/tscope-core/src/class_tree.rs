//! # Class Tree Types
//!
//! The runtime class hierarchy returned by the driver's `classes` call is a
//! nested JSON object: each key is a namespace segment (or a class name) and
//! each value is either another object of the same shape or an empty object
//! marking a concrete class.
//!
//! ```json
//! { "com": { "example": { "Foo": {}, "Bar": {} } }, "NSObject": {} }
//! ```
//!
//! [`ClassNode`] makes the terminal case explicit instead of inferring it from
//! an empty map at every use site. Entry order is the backend's order.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One level of a class hierarchy: entry name to node, in backend order.
pub type ClassTree = IndexMap<String, ClassNode>;

/// A node of the class hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClassNode {
    /// A concrete introspected class; nothing below it.
    #[default]
    Class,
    /// A namespace with at least one entry.
    Namespace(ClassTree),
}

impl ClassNode {
    pub fn is_class(&self) -> bool {
        matches!(self, ClassNode::Class)
    }

    /// Entries directly below this node, or `None` for a class.
    pub fn children(&self) -> Option<&ClassTree> {
        match self {
            ClassNode::Class => None,
            ClassNode::Namespace(tree) => Some(tree),
        }
    }

    /// Number of namespace levels below this node (`0` for a class).
    pub fn depth(&self) -> usize {
        match self {
            ClassNode::Class => 0,
            ClassNode::Namespace(tree) => 1 + tree_depth(tree),
        }
    }

    /// Number of terminal classes in this subtree.
    pub fn class_count(&self) -> usize {
        match self {
            ClassNode::Class => 1,
            ClassNode::Namespace(tree) => tree.values().map(ClassNode::class_count).sum(),
        }
    }
}

/// Depth of the deepest node in `tree` (`0` for an empty tree).
pub fn tree_depth(tree: &ClassTree) -> usize {
    tree.values().map(ClassNode::depth).max().unwrap_or(0)
}

impl<'de> Deserialize<'de> for ClassNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // `{}` and `null` both mark a class.
        let entries = Option::<ClassTree>::deserialize(deserializer)?;
        Ok(match entries {
            Some(tree) if !tree.is_empty() => ClassNode::Namespace(tree),
            _ => ClassNode::Class,
        })
    }
}

impl Serialize for ClassNode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ClassNode::Class => serializer.serialize_map(Some(0))?.end(),
            ClassNode::Namespace(tree) => tree.serialize(serializer),
        }
    }
}
