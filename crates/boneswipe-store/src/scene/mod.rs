//! Scene file import
//!
//! Provides:
//! - Scene Format v0 schema
//! - YAML parser with validation
//! - Digest canonicalization
//! - Importer orchestration

pub mod digest;
pub mod format_v0;
pub mod importer;
pub mod parser;

pub use digest::compute_scene_digest;
pub use format_v0::{SceneFileV0, SceneMeta, SceneNodeV0};
pub use importer::{import_scene, import_scene_str, ImportedScene};
pub use parser::{parse_scene_file, parse_scene_str};
