//! Depth-first traversal: per-run state, the rule-facing context and the walker

pub mod cancel;
pub mod context;
pub mod walker;

pub use cancel::CancellationToken;
pub use context::{Pass, TraversalContext, TraversalState};
pub use walker::{FailureKind, RuleFailure, TreeWalker, WalkOutcome, WalkReport};
