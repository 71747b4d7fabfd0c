//! Depth-first tree walker
//!
//! Visits every node reachable from a root, running the forward rules when a
//! node is entered and the backward rules when it is left. Recursion is
//! replaced by an explicit frame stack, so tree depth is bounded by
//! `WalkConfig::max_depth` rather than by the thread's stack.

use std::vec;

use boneswipe_core_types::RunContext;
use serde::Serialize;

use super::cancel::CancellationToken;
use super::context::{Pass, TraversalContext, TraversalState};
use crate::config::WalkConfig;
use crate::errors::{ConfigError, Result, TreeAccessError, WalkError};
use crate::host::{ActionEffector, Selection, TreeAccess};
use crate::model::Node;
use crate::rules::{Rule, RuleError, RuleOutcome, RuleSet};
use crate::{log_op_end, log_op_error, log_op_start};

/// How a walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkOutcome {
    /// Every reachable node was entered and left
    Completed,
    /// No root was supplied; nothing was visited
    NoRoot,
    /// The cancellation token fired before the walk finished
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Expression,
    Effector,
}

/// A rule failure that the active policy tolerated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFailure {
    pub node_id: String,
    pub pass: Pass,
    pub rule_index: usize,
    pub label: Option<String>,
    pub kind: FailureKind,
    pub message: String,
}

/// Summary of one walk
#[derive(Debug, Clone, Serialize)]
pub struct WalkReport {
    pub run: RunContext,
    pub outcome: WalkOutcome,
    pub nodes_visited: usize,
    /// Forward-pass predicate evaluations
    pub forward_evaluations: usize,
    /// Backward-pass predicate evaluations
    pub backward_evaluations: usize,
    pub rules_fired: usize,
    pub failures: Vec<RuleFailure>,
}

impl WalkReport {
    fn new(run: RunContext) -> Self {
        Self {
            run,
            outcome: WalkOutcome::Completed,
            nodes_visited: 0,
            forward_evaluations: 0,
            backward_evaluations: 0,
            rules_fired: 0,
            failures: Vec::new(),
        }
    }

    pub fn total_evaluations(&self) -> usize {
        self.forward_evaluations + self.backward_evaluations
    }
}

/// Children still to visit for one node on the path
struct Frame {
    children: vec::IntoIter<String>,
}

/// Everything one walk borrows
struct Walk<'w> {
    rules: &'w RuleSet,
    tree: &'w dyn TreeAccess,
    effector: &'w dyn ActionEffector,
    base: usize,
}

/// Runs rule sets over trees
///
/// A walker holds only configuration; per-run state lives in a
/// `TraversalState`, so one walker can serve many runs.
pub struct TreeWalker {
    config: WalkConfig,
    cancel: Option<CancellationToken>,
    on_no_root: Option<Box<dyn Fn(&WalkError)>>,
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self {
            config: WalkConfig::default(),
            cancel: None,
            on_no_root: None,
        }
    }
}

impl std::fmt::Debug for TreeWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWalker")
            .field("config", &self.config)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

impl TreeWalker {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `config` fails `WalkConfig::validate`.
    pub fn new(config: WalkConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Poll `token` before every node is entered
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Called once with `WalkError::EmptyRoot` when a walk has no root
    pub fn on_no_root(mut self, callback: impl Fn(&WalkError) + 'static) -> Self {
        self.on_no_root = Some(Box::new(callback));
        self
    }

    /// Walk the tree under `root_id` with fresh traversal state
    ///
    /// An empty `root_id` is not an error: the no-root callback fires and the
    /// report's outcome is `NoRoot`.
    ///
    /// # Errors
    ///
    /// - `NodeResolution` if the host cannot resolve a node
    /// - `DepthLimitExceeded` if the tree is deeper than `max_depth`
    /// - `Expression` / `Effector` if a rule fails under an abort policy
    pub fn walk(
        &self,
        root_id: &str,
        rules: &RuleSet,
        tree: &dyn TreeAccess,
        effector: &dyn ActionEffector,
    ) -> Result<WalkReport> {
        let mut state = TraversalState::new();
        self.walk_in(&mut state, root_id, rules, tree, effector)
    }

    /// Walk from the first selected node
    ///
    /// # Errors
    ///
    /// As `walk`.
    pub fn walk_selection(
        &self,
        selection: &dyn Selection,
        rules: &RuleSet,
        tree: &dyn TreeAccess,
        effector: &dyn ActionEffector,
    ) -> Result<WalkReport> {
        let root_id = selection.first_selected().unwrap_or_default();
        self.walk(&root_id, rules, tree, effector)
    }

    /// Walk using caller-owned state
    ///
    /// The state's path is left exactly as long as it was on entry, whether
    /// the walk completes, is cancelled or fails. Node depths are counted
    /// from this walk's root.
    ///
    /// # Errors
    ///
    /// As `walk`.
    pub fn walk_in(
        &self,
        state: &mut TraversalState,
        root_id: &str,
        rules: &RuleSet,
        tree: &dyn TreeAccess,
        effector: &dyn ActionEffector,
    ) -> Result<WalkReport> {
        let mut report = WalkReport::new(RunContext::new());

        if root_id.is_empty() {
            tracing::info!(
                component = module_path!(),
                op = "walk",
                event = "no_root",
                run_id = %report.run.run_id,
            );
            if let Some(callback) = &self.on_no_root {
                callback(&WalkError::EmptyRoot);
            }
            report.outcome = WalkOutcome::NoRoot;
            return Ok(report);
        }

        log_op_start!("walk", root_id = root_id, run_id = %report.run.run_id);

        let walk = Walk {
            rules,
            tree,
            effector,
            base: state.depth(),
        };
        let result = self.drive(&walk, state, root_id, &mut report);
        state.truncate(walk.base);

        match result {
            Ok(outcome) => {
                report.outcome = outcome;
                log_op_end!(
                    "walk",
                    duration_ms = report.run.elapsed_ms(),
                    run_id = %report.run.run_id,
                    nodes_visited = report.nodes_visited,
                    rules_fired = report.rules_fired,
                    outcome = ?outcome,
                );
                Ok(report)
            }
            Err(err) => {
                log_op_error!(
                    "walk",
                    err.clone(),
                    duration_ms = report.run.elapsed_ms(),
                    run_id = %report.run.run_id,
                    nodes_visited = report.nodes_visited,
                );
                Err(err)
            }
        }
    }

    fn drive(
        &self,
        walk: &Walk<'_>,
        state: &mut TraversalState,
        root_id: &str,
        report: &mut WalkReport,
    ) -> Result<WalkOutcome> {
        let mut frames: Vec<Frame> = Vec::new();

        match self.enter(walk, state, root_id, report)? {
            Some(frame) => frames.push(frame),
            None => return Ok(WalkOutcome::Cancelled),
        }

        while let Some(frame) = frames.last_mut() {
            match frame.children.next() {
                Some(child_id) => match self.enter(walk, state, &child_id, report)? {
                    Some(child) => frames.push(child),
                    None => return Ok(WalkOutcome::Cancelled),
                },
                None => {
                    frames.pop();
                    self.leave(walk, state, report)?;
                }
            }
        }

        Ok(WalkOutcome::Completed)
    }

    /// Capture a node, push it, run the forward pass and list its children
    ///
    /// Returns `None` when cancelled before the node was touched.
    fn enter(
        &self,
        walk: &Walk<'_>,
        state: &mut TraversalState,
        node_id: &str,
        report: &mut WalkReport,
    ) -> Result<Option<Frame>> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            tracing::info!(
                component = module_path!(),
                op = "walk",
                event = "cancelled",
                node_id = node_id,
            );
            return Ok(None);
        }

        let depth = state.depth() - walk.base;
        if depth >= self.config.max_depth {
            return Err(WalkError::DepthLimitExceeded {
                node_id: node_id.to_string(),
                max_depth: self.config.max_depth,
            });
        }

        let resolution = |source: TreeAccessError| WalkError::NodeResolution {
            node_id: node_id.to_string(),
            source,
        };

        if !walk.tree.exists(node_id) {
            return Err(resolution(TreeAccessError::NotFound {
                node_id: node_id.to_string(),
            }));
        }
        let attrs = walk.tree.attributes(node_id).map_err(resolution)?;

        let index = state.next_index();
        state.push(Node::capture(node_id, attrs, index, depth + 1));
        report.nodes_visited += 1;

        {
            let path = state.path();
            let current = path.last().ok_or_else(|| WalkError::Internal {
                message: "path empty after push".to_string(),
            })?;
            let ctx = TraversalContext::new(current, path, Pass::Forward);
            self.run_pass(walk, &walk.rules.forward, &ctx, report)?;
        }

        let children = walk.tree.children(node_id).map_err(resolution)?;
        Ok(Some(Frame {
            children: children.into_iter(),
        }))
    }

    /// Pop the current node and run the backward pass on it
    fn leave(
        &self,
        walk: &Walk<'_>,
        state: &mut TraversalState,
        report: &mut WalkReport,
    ) -> Result<()> {
        let node = state.pop().ok_or_else(|| WalkError::Internal {
            message: "leaving a node with an empty path".to_string(),
        })?;
        let ctx = TraversalContext::new(&node, state.path(), Pass::Backward);
        self.run_pass(walk, &walk.rules.backward, &ctx, report)
    }

    fn run_pass(
        &self,
        walk: &Walk<'_>,
        rules: &[Rule],
        ctx: &TraversalContext<'_>,
        report: &mut WalkReport,
    ) -> Result<()> {
        let pass = ctx.pass();

        for (rule_index, rule) in rules.iter().enumerate() {
            match pass {
                Pass::Forward => report.forward_evaluations += 1,
                Pass::Backward => report.backward_evaluations += 1,
            }

            let err = match rule.run(ctx, walk.effector) {
                Ok(RuleOutcome::Fired) => {
                    report.rules_fired += 1;
                    continue;
                }
                Ok(RuleOutcome::Skipped) => continue,
                Err(err) => err,
            };

            let node_id = ctx.name().to_string();
            let (kind, message) = match err {
                RuleError::Predicate(source) => {
                    if self.config.on_expression_error.is_fatal() {
                        return Err(WalkError::Expression {
                            node_id,
                            pass,
                            rule_index,
                            source,
                        });
                    }
                    (FailureKind::Expression, source.to_string())
                }
                RuleError::Action(source) => {
                    if self.config.on_effector_error.is_fatal() {
                        return Err(WalkError::Effector {
                            node_id,
                            pass,
                            rule_index,
                            source,
                        });
                    }
                    (FailureKind::Effector, source.to_string())
                }
            };

            tracing::warn!(
                component = module_path!(),
                op = "walk",
                event = crate::schema::EVENT_RULE_FAILED,
                node_id = node_id.as_str(),
                pass = %pass,
                rule_index = rule_index,
                error = message.as_str(),
            );
            report.failures.push(RuleFailure {
                node_id,
                pass,
                rule_index,
                label: rule.label().map(str::to_string),
                kind,
                message,
            });
        }

        Ok(())
    }
}
