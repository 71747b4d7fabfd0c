//! Error handling for boneswipe-store
//!
//! Wraps the core `SwError` with store-specific helpers

use boneswipe_core::errors::{SwError, SwErrorKind};
use boneswipe_core::scene::SceneError;

/// Result type alias using SwError
pub type Result<T> = std::result::Result<T, SwError>;

/// Create a scene validation error
pub fn scene_validation(reason: &str) -> SwError {
    SwError::new(SwErrorKind::InvalidInput)
        .with_op("scene_parse")
        .with_message(reason.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> SwError {
    SwError::new(SwErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a serialization error
pub fn serialization_error(operation: &str, err: impl std::fmt::Display) -> SwError {
    SwError::new(SwErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Convert a structural scene error raised while building the graph
pub fn from_scene_error(err: SceneError) -> SwError {
    let kind = match err {
        SceneError::UnknownNode { .. } => SwErrorKind::NotFound,
        _ => SwErrorKind::InvalidInput,
    };
    SwError::new(kind)
        .with_op("scene_import")
        .with_message(err.to_string())
}
