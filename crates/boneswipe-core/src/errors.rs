use boneswipe_core_types::RunId;
use thiserror::Error;

use crate::traversal::Pass;

/// Result type alias using WalkError
pub type Result<T> = std::result::Result<T, WalkError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// raised by the engine and its hosts. Each kind maps to a stable error code
/// that can be used for programmatic error handling, testing, and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwErrorKind {
    // Input
    InvalidInput,
    EmptyRoot,
    NotFound,

    // Traversal
    NodeResolution,
    DepthLimitExceeded,

    // Rules
    ExpressionSyntax,
    ExpressionEvaluation,
    Effector,

    // Integration/IO
    Config,
    Io,
    Serialization,

    // Internal
    Internal,
}

impl SwErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            SwErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            SwErrorKind::EmptyRoot => "ERR_EMPTY_ROOT",
            SwErrorKind::NotFound => "ERR_NOT_FOUND",
            SwErrorKind::NodeResolution => "ERR_NODE_RESOLUTION",
            SwErrorKind::DepthLimitExceeded => "ERR_DEPTH_LIMIT",
            SwErrorKind::ExpressionSyntax => "ERR_EXPRESSION_SYNTAX",
            SwErrorKind::ExpressionEvaluation => "ERR_EXPRESSION",
            SwErrorKind::Effector => "ERR_EFFECTOR",
            SwErrorKind::Config => "ERR_CONFIG",
            SwErrorKind::Io => "ERR_IO",
            SwErrorKind::Serialization => "ERR_SERIALIZATION",
            SwErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and the node id,
/// pass and rule index needed to diagnose a failed walk.
#[derive(Debug, Clone)]
pub struct SwError {
    kind: SwErrorKind,
    op: Option<String>,
    node_id: Option<String>,
    pass: Option<Pass>,
    rule_index: Option<usize>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<SwError>>,
}

impl SwError {
    /// Create a new error with the specified kind
    pub fn new(kind: SwErrorKind) -> Self {
        Self {
            kind,
            op: None,
            node_id: None,
            pass: None,
            rule_index: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add node ID context
    pub fn with_node_id(mut self, id: impl Into<String>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    /// Add pass context
    pub fn with_pass(mut self, pass: Pass) -> Self {
        self.pass = Some(pass);
        self
    }

    /// Add rule index context
    pub fn with_rule_index(mut self, index: usize) -> Self {
        self.rule_index = Some(index);
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: SwError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> SwErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the node ID context, if any
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    /// Get the pass context, if any
    pub fn pass(&self) -> Option<Pass> {
        self.pass
    }

    /// Get the rule index context, if any
    pub fn rule_index(&self) -> Option<usize> {
        self.rule_index
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&SwError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for SwError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(node_id) = &self.node_id {
            write!(f, " (node_id: {})", node_id)?;
        }
        if let Some(pass) = self.pass {
            write!(f, " (pass: {})", pass)?;
        }
        if let Some(rule_index) = self.rule_index {
            write!(f, " (rule_index: {})", rule_index)?;
        }
        Ok(())
    }
}

impl std::error::Error for SwError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Failure reported by a `TreeAccess` host
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeAccessError {
    /// The host has no node with this id
    #[error("node not found: {node_id}")]
    NotFound { node_id: String },

    /// The host knows the node but could not read it
    #[error("node {node_id} is unavailable: {reason}")]
    Unavailable { node_id: String, reason: String },
}

/// Why an expression failed to compile or evaluate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionCause {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("unknown name '{name}'")]
    UnknownName { name: String },

    #[error("'{name}' expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid regex '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },
}

impl ExpressionCause {
    /// Whether this cause is detected before any node is evaluated
    pub fn is_compile_time(&self) -> bool {
        !matches!(self, ExpressionCause::TypeMismatch { .. })
    }
}

/// An expression that could not be compiled or evaluated
#[derive(Error, Debug, Clone, PartialEq)]
#[error("expression `{text}` failed: {cause}")]
pub struct ExpressionError {
    /// The offending expression text
    pub text: String,
    /// The underlying cause
    pub cause: ExpressionCause,
}

impl ExpressionError {
    pub fn new(text: impl Into<String>, cause: ExpressionCause) -> Self {
        Self {
            text: text.into(),
            cause,
        }
    }
}

/// Failure reported by an `ActionEffector`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectorError {
    /// The effector has no node with this id
    #[error("effector target not found: {node_id}")]
    NodeNotFound { node_id: String },

    /// The host refused the mutation
    #[error("effector rejected change on {node_id}: {reason}")]
    Rejected { node_id: String, reason: String },

    /// The host could not be reached or is busy
    #[error("effector unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Configuration loading failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Read { path: String, message: String },

    #[error("invalid config: {message}")]
    Parse { message: String },

    #[error("invalid config value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Error taxonomy for a traversal run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalkError {
    /// No root node was supplied; the walk did not start
    #[error("no root node selected")]
    EmptyRoot,

    /// The tree-access host could not resolve a node during the walk
    #[error("could not resolve node {node_id}: {source}")]
    NodeResolution {
        node_id: String,
        source: TreeAccessError,
    },

    /// A rule predicate failed under the abort policy
    #[error("rule {rule_index} ({pass} pass) at node {node_id}: {source}")]
    Expression {
        node_id: String,
        pass: Pass,
        rule_index: usize,
        source: ExpressionError,
    },

    /// A rule action failed under the abort policy
    #[error("rule {rule_index} ({pass} pass) at node {node_id}: {source}")]
    Effector {
        node_id: String,
        pass: Pass,
        rule_index: usize,
        source: EffectorError,
    },

    /// The tree is deeper than the configured maximum
    #[error("depth limit {max_depth} exceeded at node {node_id}")]
    DepthLimitExceeded { node_id: String, max_depth: usize },

    /// Internal invariant broken
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl WalkError {
    /// The node the failure is attributed to, if any
    pub fn node_id(&self) -> Option<&str> {
        match self {
            WalkError::NodeResolution { node_id, .. }
            | WalkError::Expression { node_id, .. }
            | WalkError::Effector { node_id, .. }
            | WalkError::DepthLimitExceeded { node_id, .. } => Some(node_id),
            WalkError::EmptyRoot | WalkError::Internal { .. } => None,
        }
    }
}

/// Conversion from WalkError to SwError (canonical error facility)
impl From<WalkError> for SwError {
    fn from(err: WalkError) -> Self {
        match err {
            WalkError::EmptyRoot => SwError::new(SwErrorKind::EmptyRoot)
                .with_op("walk")
                .with_message("No root node selected"),

            WalkError::NodeResolution { node_id, source } => {
                let kind = match source {
                    TreeAccessError::NotFound { .. } => SwErrorKind::NotFound,
                    TreeAccessError::Unavailable { .. } => SwErrorKind::Io,
                };
                SwError::new(SwErrorKind::NodeResolution)
                    .with_op("resolve_node")
                    .with_node_id(node_id)
                    .with_message("Node could not be resolved")
                    .with_source(SwError::new(kind).with_message(source.to_string()))
            }

            WalkError::Expression {
                node_id,
                pass,
                rule_index,
                source,
            } => SwError::from(source)
                .with_op("evaluate_predicate")
                .with_node_id(node_id)
                .with_pass(pass)
                .with_rule_index(rule_index),

            WalkError::Effector {
                node_id,
                pass,
                rule_index,
                source,
            } => SwError::new(SwErrorKind::Effector)
                .with_op("run_action")
                .with_node_id(node_id)
                .with_pass(pass)
                .with_rule_index(rule_index)
                .with_message(source.to_string()),

            WalkError::DepthLimitExceeded { node_id, max_depth } => {
                SwError::new(SwErrorKind::DepthLimitExceeded)
                    .with_op("walk")
                    .with_node_id(node_id)
                    .with_message(format!("Tree deeper than {}", max_depth))
            }

            WalkError::Internal { message } => {
                SwError::new(SwErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<ExpressionError> for SwError {
    fn from(err: ExpressionError) -> Self {
        let kind = if err.cause.is_compile_time() {
            SwErrorKind::ExpressionSyntax
        } else {
            SwErrorKind::ExpressionEvaluation
        };
        SwError::new(kind)
            .with_op("compile_expression")
            .with_message(err.to_string())
    }
}

impl From<ConfigError> for SwError {
    fn from(err: ConfigError) -> Self {
        SwError::new(SwErrorKind::Config)
            .with_op("load_config")
            .with_message(err.to_string())
    }
}
