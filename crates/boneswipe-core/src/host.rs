//! Host contracts consumed by the engine
//!
//! The engine owns no tree and performs no mutation itself. A host (a live
//! scene, the in-memory `SceneGraph`, a test double) implements these traits:
//!
//! - `TreeAccess` - enumerate and describe nodes
//! - `ActionEffector` - perform the side effects rule actions ask for
//! - `Selection` - supply the root for a run
//!
//! All methods take `&self`. Hosts that mutate state keep it behind interior
//! mutability, which lets one object serve as both tree and effector during a
//! walk.

use crate::errors::{EffectorError, TreeAccessError};
use crate::model::{Node, NodeAttributes};

/// Read access to a tree of nodes
pub trait TreeAccess {
    /// Check whether a node with this id exists
    fn exists(&self, node_id: &str) -> bool;

    /// Ordered child ids of a node (empty for leaves)
    ///
    /// # Errors
    ///
    /// Returns `TreeAccessError` if the node cannot be resolved.
    fn children(&self, node_id: &str) -> Result<Vec<String>, TreeAccessError>;

    /// Current attributes of a node
    ///
    /// # Errors
    ///
    /// Returns `TreeAccessError` if the node cannot be resolved.
    fn attributes(&self, node_id: &str) -> Result<NodeAttributes, TreeAccessError>;
}

/// Side-effecting operations rule actions may request
pub trait ActionEffector {
    /// Create an independent marker object aligned to the node's world transform
    ///
    /// Returns the id of the created marker.
    ///
    /// # Errors
    ///
    /// Returns `EffectorError` if the host refuses or cannot find the node.
    fn spawn_marker(&self, node: &Node) -> Result<String, EffectorError>;

    /// Zero the node's local rotation, folding it into its rest orientation
    ///
    /// This is a permanent bake; there is no inverse operation.
    ///
    /// # Errors
    ///
    /// Returns `EffectorError` if the host refuses or cannot find the node.
    fn normalize_orientation(&self, node: &Node) -> Result<(), EffectorError>;
}

/// Effector that performs nothing and always succeeds
///
/// Useful for dry runs and for rule sets whose actions only record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEffector;

impl ActionEffector for NoopEffector {
    fn spawn_marker(&self, node: &Node) -> Result<String, EffectorError> {
        Ok(format!("noop:{}", node.id))
    }

    fn normalize_orientation(&self, _node: &Node) -> Result<(), EffectorError> {
        Ok(())
    }
}

/// Source of the root node for a run (e.g. the current scene selection)
pub trait Selection {
    /// First selected node id, if anything is selected
    fn first_selected(&self) -> Option<String>;
}

/// A fixed selection, handy for CLIs and tests
impl Selection for Option<String> {
    fn first_selected(&self) -> Option<String> {
        self.clone().filter(|id| !id.is_empty())
    }
}
