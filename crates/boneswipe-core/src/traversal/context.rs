use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::expr::helpers;
use crate::model::Node;

/// Which half of a visit is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pass {
    /// On entry, before any child is visited (pre-order)
    Forward,
    /// On exit, after every descendant finished (post-order)
    Backward,
}

impl std::fmt::Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pass::Forward => write!(f, "forward"),
            Pass::Backward => write!(f, "backward"),
        }
    }
}

/// Mutable per-run state: the ancestor path stack and the visitation counter
///
/// Owned by exactly one walk at a time (the walker borrows it mutably).
/// Whatever way a walk ends, `path` is left at the length it had when the
/// walk began.
#[derive(Debug, Clone, Default)]
pub struct TraversalState {
    path: Vec<Node>,
    visited: u32,
}

impl TraversalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes from the root to the node being visited, root first
    pub fn path(&self) -> &[Node] {
        &self.path
    }

    /// Number of nodes entered so far (the last assigned index)
    pub fn visited(&self) -> u32 {
        self.visited
    }

    pub(crate) fn next_index(&mut self) -> u32 {
        self.visited += 1;
        self.visited
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.path.push(node);
    }

    pub(crate) fn pop(&mut self) -> Option<Node> {
        self.path.pop()
    }

    pub(crate) fn depth(&self) -> usize {
        self.path.len()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.path.truncate(len);
    }
}

/// Read-only view of the walk handed to every rule
#[derive(Debug, Clone, Copy)]
pub struct TraversalContext<'a> {
    current: &'a Node,
    path: &'a [Node],
    pass: Pass,
}

impl<'a> TraversalContext<'a> {
    pub fn new(current: &'a Node, path: &'a [Node], pass: Pass) -> Self {
        Self {
            current,
            path,
            pass,
        }
    }

    /// The node being visited
    pub fn current(&self) -> &'a Node {
        self.current
    }

    /// Identifier of the node being visited
    pub fn name(&self) -> &'a str {
        &self.current.id
    }

    /// Ancestor path at this moment
    ///
    /// Ends with `current` in the forward pass; excludes it in the backward
    /// pass because the node has already been popped.
    pub fn path(&self) -> &'a [Node] {
        self.path
    }

    pub fn pass(&self) -> Pass {
        self.pass
    }

    /// Root-to-current sequence, inclusive, in either pass
    pub fn lineage(&self) -> Vec<&'a Node> {
        let mut lineage: Vec<&'a Node> = self.path.iter().collect();
        let ends_with_current = lineage
            .last()
            .is_some_and(|last| std::ptr::eq(*last, self.current));
        if !ends_with_current {
            lineage.push(self.current);
        }
        lineage
    }

    /// True iff `pred` holds for the current node or any ancestor
    pub fn has_past(&self, mut pred: impl FnMut(&Node) -> bool) -> bool {
        self.lineage().into_iter().any(|node| pred(node))
    }

    /// True iff the nearest boundary above (or at) the current node matches
    /// `start` rather than `end`; `end` wins when one node matches both
    pub fn is_between(
        &self,
        mut start: impl FnMut(&Node) -> bool,
        mut end: impl FnMut(&Node) -> bool,
    ) -> bool {
        let lineage = self.lineage();
        let result: Result<bool, Infallible> = helpers::is_between(
            &lineage,
            |scope| Ok(scope.last().is_some_and(|n| start(*n))),
            |scope| Ok(scope.last().is_some_and(|n| end(*n))),
        );
        match result {
            Ok(found) => found,
            Err(never) => match never {},
        }
    }
}
