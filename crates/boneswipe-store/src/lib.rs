//! boneswipe store - scene files on disk
//!
//! Provides:
//! - Scene Format v0 schema
//! - YAML parser with structural validation
//! - Digest canonicalization
//! - Importer that builds an in-memory `SceneGraph`

pub mod errors;
pub mod scene;

// Re-export key types
pub use errors::Result;
pub use scene::{import_scene, import_scene_str, ImportedScene, SceneFileV0};
