use serde::{Deserialize, Serialize};

use super::vector::Vec3;

/// Attributes of one tree element as reported by a `TreeAccess` host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    /// Parent identifier, empty for the root of the hierarchy
    pub parent_id: String,
    pub translation: Vec3,
    /// Local rotation, Euler XYZ in degrees
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Persistent rest orientation; zero when the host has none
    pub joint_orient: Vec3,
    pub child_count: usize,
}

impl Default for NodeAttributes {
    fn default() -> Self {
        Self {
            parent_id: String::new(),
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            joint_orient: Vec3::ZERO,
            child_count: 0,
        }
    }
}

/// Node - immutable snapshot of one tree element at visitation time
///
/// A Node is captured from the host right before its forward rules run and is
/// never mutated afterwards. Visiting the same element twice (in two walks)
/// produces two distinct snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier of the tree element
    pub id: String,

    /// Parent identifier (empty for root)
    pub parent_id: String,

    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub joint_orient: Vec3,

    /// Number of children reported by the host
    pub child_count: usize,

    /// 1-based position in visitation order
    pub index: u32,

    /// 1-based depth in the walk (the walk's root has depth 1)
    pub depth: usize,
}

impl Node {
    /// Capture a snapshot from host attributes
    pub fn capture(id: impl Into<String>, attrs: NodeAttributes, index: u32, depth: usize) -> Self {
        Self {
            id: id.into(),
            parent_id: attrs.parent_id,
            translation: attrs.translation,
            rotation: attrs.rotation,
            scale: attrs.scale,
            joint_orient: attrs.joint_orient,
            child_count: attrs.child_count,
            index,
            depth,
        }
    }

    /// Check if this node has no parent in the host hierarchy
    pub fn is_root(&self) -> bool {
        self.parent_id.is_empty()
    }

    /// Check if this node has no children
    pub fn is_leaf(&self) -> bool {
        self.child_count == 0
    }
}
