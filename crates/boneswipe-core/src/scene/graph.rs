use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::errors::{EffectorError, TreeAccessError};
use crate::host::{ActionEffector, Selection, TreeAccess};
use crate::model::{LocalTransform, Mat3, Node, NodeAttributes, Vec3, WorldTransform};

/// Structural error while building a scene
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("node already exists: {id}")]
    DuplicateNode { id: String },

    #[error("unknown node: {id}")]
    UnknownNode { id: String },

    #[error("node {child} already has parent {parent}")]
    AlreadyParented { child: String, parent: String },

    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: String, child: String },
}

/// A marker created by `spawn_marker`, frozen at the node's world transform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub node_id: String,
    pub translate: Vec3,
    /// World orientation, Euler XYZ degrees
    pub rotate: Vec3,
    pub scale: Vec3,
}

#[derive(Debug, Clone)]
struct SceneNode {
    local: LocalTransform,
    parent: Option<String>,
    children: Vec<String>,
    locked: bool,
}

#[derive(Debug, Default)]
struct SceneData {
    nodes: HashMap<String, SceneNode>,
    /// Insertion order, for deterministic root listing
    order: Vec<String>,
    markers: Vec<Marker>,
    selection: Vec<String>,
}

impl SceneData {
    fn world_transform(&self, id: &str) -> Option<WorldTransform> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.nodes.get(current)?;
            chain.push(&node.local);
            cursor = node.parent.as_deref();
        }
        Some(
            chain
                .iter()
                .rev()
                .fold(WorldTransform::IDENTITY, |world, local| world.then(local)),
        )
    }

    fn is_ancestor(&self, candidate: &str, of: &str) -> bool {
        let mut cursor = Some(of);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|n| n.parent.as_deref());
        }
        false
    }
}

/// In-memory hierarchy that serves as tree, effector and selection
///
/// Structure is built through `&mut self`; once a walk starts, only the
/// effector methods change it, through interior mutability.
#[derive(Debug, Default)]
pub struct SceneGraph {
    name: String,
    inner: RefCell<SceneData>,
}

impl SceneGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: RefCell::new(SceneData::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a parentless node
    ///
    /// # Errors
    ///
    /// Returns `SceneError::DuplicateNode` if the id is taken.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        local: LocalTransform,
    ) -> Result<(), SceneError> {
        let id = id.into();
        let data = self.inner.get_mut();
        if data.nodes.contains_key(&id) {
            return Err(SceneError::DuplicateNode { id });
        }
        data.nodes.insert(
            id.clone(),
            SceneNode {
                local,
                parent: None,
                children: Vec::new(),
                locked: false,
            },
        );
        data.order.push(id);
        Ok(())
    }

    /// Append `child` to `parent`'s ordered children
    ///
    /// # Errors
    ///
    /// Fails if either node is unknown, `child` already has a parent, or
    /// `child` is `parent` or one of its ancestors.
    pub fn attach(&mut self, parent: &str, child: &str) -> Result<(), SceneError> {
        let data = self.inner.get_mut();
        for id in [parent, child] {
            if !data.nodes.contains_key(id) {
                return Err(SceneError::UnknownNode { id: id.to_string() });
            }
        }
        if let Some(existing) = data.nodes.get(child).and_then(|n| n.parent.clone()) {
            return Err(SceneError::AlreadyParented {
                child: child.to_string(),
                parent: existing,
            });
        }
        if data.is_ancestor(child, parent) {
            return Err(SceneError::Cycle {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }

        if let Some(node) = data.nodes.get_mut(child) {
            node.parent = Some(parent.to_string());
        }
        if let Some(node) = data.nodes.get_mut(parent) {
            node.children.push(child.to_string());
        }
        Ok(())
    }

    /// Locked nodes refuse orientation changes
    ///
    /// # Errors
    ///
    /// Returns `SceneError::UnknownNode` if the node does not exist.
    pub fn set_locked(&mut self, id: &str, locked: bool) -> Result<(), SceneError> {
        let node = self
            .inner
            .get_mut()
            .nodes
            .get_mut(id)
            .ok_or_else(|| SceneError::UnknownNode { id: id.to_string() })?;
        node.locked = locked;
        Ok(())
    }

    /// Append a node to the selection
    ///
    /// # Errors
    ///
    /// Returns `SceneError::UnknownNode` if the node does not exist.
    pub fn select(&mut self, id: &str) -> Result<(), SceneError> {
        let data = self.inner.get_mut();
        if !data.nodes.contains_key(id) {
            return Err(SceneError::UnknownNode { id: id.to_string() });
        }
        data.selection.push(id.to_string());
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.borrow().nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parentless nodes in insertion order
    pub fn roots(&self) -> Vec<String> {
        let data = self.inner.borrow();
        data.order
            .iter()
            .filter(|id| data.nodes.get(*id).is_some_and(|n| n.parent.is_none()))
            .cloned()
            .collect()
    }

    pub fn selection(&self) -> Vec<String> {
        self.inner.borrow().selection.clone()
    }

    /// Current local transform of a node
    pub fn local_transform(&self, id: &str) -> Option<LocalTransform> {
        self.inner.borrow().nodes.get(id).map(|n| n.local)
    }

    /// Composition of local transforms from the node's root down to it
    pub fn world_transform(&self, id: &str) -> Option<WorldTransform> {
        self.inner.borrow().world_transform(id)
    }

    /// Markers spawned so far, in creation order
    pub fn markers(&self) -> Vec<Marker> {
        self.inner.borrow().markers.clone()
    }

    fn read(&self, node_id: &str) -> Result<std::cell::Ref<'_, SceneData>, TreeAccessError> {
        self.inner
            .try_borrow()
            .map_err(|_| TreeAccessError::Unavailable {
                node_id: node_id.to_string(),
                reason: "scene is being modified".to_string(),
            })
    }

    fn write(&self) -> Result<std::cell::RefMut<'_, SceneData>, EffectorError> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| EffectorError::Unavailable {
                reason: "scene is borrowed".to_string(),
            })
    }
}

impl TreeAccess for SceneGraph {
    fn exists(&self, node_id: &str) -> bool {
        self.contains(node_id)
    }

    fn children(&self, node_id: &str) -> Result<Vec<String>, TreeAccessError> {
        let data = self.read(node_id)?;
        data.nodes
            .get(node_id)
            .map(|n| n.children.clone())
            .ok_or_else(|| TreeAccessError::NotFound {
                node_id: node_id.to_string(),
            })
    }

    fn attributes(&self, node_id: &str) -> Result<NodeAttributes, TreeAccessError> {
        let data = self.read(node_id)?;
        let node = data
            .nodes
            .get(node_id)
            .ok_or_else(|| TreeAccessError::NotFound {
                node_id: node_id.to_string(),
            })?;
        Ok(NodeAttributes {
            parent_id: node.parent.clone().unwrap_or_default(),
            translation: node.local.translate,
            rotation: node.local.rotate,
            scale: node.local.scale,
            joint_orient: node.local.joint_orient,
            child_count: node.children.len(),
        })
    }
}

impl ActionEffector for SceneGraph {
    fn spawn_marker(&self, node: &Node) -> Result<String, EffectorError> {
        let mut data = self.write()?;
        let world = data
            .world_transform(&node.id)
            .ok_or_else(|| EffectorError::NodeNotFound {
                node_id: node.id.clone(),
            })?;

        let id = format!("{}_marker{}", node.id, data.markers.len() + 1);
        data.markers.push(Marker {
            id: id.clone(),
            node_id: node.id.clone(),
            translate: world.translate,
            rotate: world.rotation_degrees(),
            scale: world.scale,
        });
        Ok(id)
    }

    fn normalize_orientation(&self, node: &Node) -> Result<(), EffectorError> {
        let mut data = self.write()?;
        let target = data
            .nodes
            .get_mut(&node.id)
            .ok_or_else(|| EffectorError::NodeNotFound {
                node_id: node.id.clone(),
            })?;
        if target.locked {
            return Err(EffectorError::Rejected {
                node_id: node.id.clone(),
                reason: "node is locked".to_string(),
            });
        }

        let baked = Mat3::from_euler_degrees(target.local.joint_orient)
            * Mat3::from_euler_degrees(target.local.rotate);
        target.local.joint_orient = baked.to_euler_degrees();
        target.local.rotate = Vec3::ZERO;
        Ok(())
    }
}

impl Selection for SceneGraph {
    fn first_selected(&self) -> Option<String> {
        self.inner.borrow().selection.first().cloned()
    }
}
