//! boneswipe core - hierarchical rule-traversal engine
//!
//! This crate walks a rooted tree (a joint hierarchy in the original domain)
//! depth-first and runs ordered rule lists at every node:
//! - Node snapshots and the live traversal context
//! - A sandboxed predicate expression language with path-aware helpers
//! - Rules (predicate + action) and forward/backward rule sets
//! - An explicit-stack tree walker with depth bound and cancellation
//! - Failure policies and walk configuration
//! - An in-memory scene that implements the host contracts

pub mod config;
pub mod errors;
pub mod expr;
pub mod host;
pub mod logging_facility;
pub mod model;
pub mod policy;
pub mod rules;
pub mod scene;
pub mod traversal;

pub use boneswipe_core_types::schema;

// Re-export commonly used types
pub use config::WalkConfig;
pub use errors::{EffectorError, ExpressionError, Result, SwError, SwErrorKind, WalkError};
pub use expr::Expression;
pub use host::{ActionEffector, Selection, TreeAccess};
pub use model::{Node, NodeAttributes, Vec3};
pub use policy::{EffectorErrorPolicy, ExpressionErrorPolicy};
pub use rules::{Rule, RuleOutcome, RuleSet};
pub use scene::SceneGraph;
pub use traversal::{
    CancellationToken, Pass, TraversalContext, TraversalState, TreeWalker, WalkOutcome,
    WalkReport,
};
