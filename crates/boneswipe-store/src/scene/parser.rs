//! Scene parser with validation
//!
//! Parses YAML and validates schema version, id uniqueness and that the
//! declared children form a forest

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::errors::{io_error, scene_validation, Result};
use crate::scene::format_v0::SceneFileV0;

/// Parse a scene file from a path
///
/// # Errors
///
/// Returns an `Io` error if the file cannot be read, otherwise as
/// `parse_scene_str`.
pub fn parse_scene_file(path: &Path) -> Result<SceneFileV0> {
    let content = fs::read_to_string(path).map_err(|e| io_error("scene_read", e))?;
    parse_scene_str(&content)
}

/// Parse a scene from a string
///
/// # Errors
///
/// Returns an `InvalidInput` error for malformed YAML or a scene that
/// fails validation.
pub fn parse_scene_str(content: &str) -> Result<SceneFileV0> {
    let file: SceneFileV0 = serde_yaml::from_str(content)
        .map_err(|e| scene_validation(&format!("YAML parse error: {}", e)))?;

    validate_scene(&file)?;

    Ok(file)
}

fn validate_scene(file: &SceneFileV0) -> Result<()> {
    if file.schema_version != 0 {
        return Err(scene_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            file.schema_version
        )));
    }

    let mut ids = HashSet::new();
    for node in &file.nodes {
        if node.id.is_empty() {
            return Err(scene_validation("Node with empty id"));
        }
        if !ids.insert(node.id.as_str()) {
            return Err(scene_validation(&format!("Duplicate node id: {}", node.id)));
        }
    }

    // child -> parent, rejecting dangling references and second parents
    let mut parent_of: HashMap<&str, &str> = HashMap::new();
    for node in &file.nodes {
        for child in &node.children {
            if !ids.contains(child.as_str()) {
                return Err(scene_validation(&format!(
                    "Node {} lists non-existent child: {}",
                    node.id, child
                )));
            }
            if let Some(previous) = parent_of.insert(child.as_str(), node.id.as_str()) {
                return Err(scene_validation(&format!(
                    "Node {} has more than one parent: {} and {}",
                    child, previous, node.id
                )));
            }
        }
    }

    // With a single parent each, a cycle shows up as a parent chain that
    // never reaches a root.
    for node in &file.nodes {
        let mut cursor = node.id.as_str();
        let mut steps = 0;
        while let Some(&parent) = parent_of.get(cursor) {
            steps += 1;
            if steps > file.nodes.len() {
                return Err(scene_validation(&format!(
                    "Cycle detected through node {}",
                    node.id
                )));
            }
            cursor = parent;
        }
    }

    for selected in &file.selection {
        if !ids.contains(selected.as_str()) {
            return Err(scene_validation(&format!(
                "Selection references non-existent node: {}",
                selected
            )));
        }
    }

    Ok(())
}
