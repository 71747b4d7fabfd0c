use std::cell::RefCell;
use std::rc::Rc;

use boneswipe_core::errors::TreeAccessError;
use boneswipe_core::model::LocalTransform;
use boneswipe_core::rules::{action_fn, Action};
use boneswipe_core::{NodeAttributes, SceneGraph, TreeAccess};

/// Shared log of `tag:node` entries written by recording actions
pub type Log = Rc<RefCell<Vec<String>>>;

#[allow(dead_code)]
pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Build a scene from `(parent, children)` edges, declaring nodes in order
#[allow(dead_code)]
pub fn build_scene(edges: Vec<(&str, Vec<&str>)>) -> SceneGraph {
    let mut scene = SceneGraph::new("test");
    for (parent, children) in &edges {
        for id in std::iter::once(parent).chain(children.iter()) {
            if !scene.contains(id) {
                scene.add_node(*id, LocalTransform::default()).unwrap();
            }
        }
    }
    for (parent, children) in &edges {
        for child in children {
            scene.attach(parent, child).unwrap();
        }
    }
    scene
}

/// root -> A -> {B, C -> D}
#[allow(dead_code)]
pub fn sample_scene() -> SceneGraph {
    build_scene(vec![("root", vec!["A"]), ("A", vec!["B", "C"]), ("C", vec!["D"])])
}

/// Action that appends `tag:node_id` to `log`
#[allow(dead_code)]
pub fn record(log: &Log, tag: &'static str) -> impl Action {
    let log = log.clone();
    action_fn(move |ctx, _| {
        log.borrow_mut().push(format!("{}:{}", tag, ctx.name()));
        Ok(())
    })
}

#[allow(dead_code)]
pub fn entries(log: &Log, tag: &str) -> Vec<String> {
    let prefix = format!("{}:", tag);
    log.borrow()
        .iter()
        .filter_map(|e| e.strip_prefix(&prefix).map(str::to_string))
        .collect()
}

/// Tree that lists a child the host cannot resolve
#[allow(dead_code)]
pub struct DanglingChildTree {
    pub inner: SceneGraph,
    pub parent: String,
    pub ghost: String,
}

impl TreeAccess for DanglingChildTree {
    fn exists(&self, node_id: &str) -> bool {
        self.inner.exists(node_id)
    }

    fn children(&self, node_id: &str) -> Result<Vec<String>, TreeAccessError> {
        let mut children = self.inner.children(node_id)?;
        if node_id == self.parent {
            children.push(self.ghost.clone());
        }
        Ok(children)
    }

    fn attributes(&self, node_id: &str) -> Result<NodeAttributes, TreeAccessError> {
        self.inner.attributes(node_id)
    }
}
