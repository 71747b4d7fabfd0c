//! Scene importer orchestration
//!
//! Builds an in-memory `SceneGraph` from a validated scene file

use std::path::Path;

use boneswipe_core::scene::SceneGraph;
use boneswipe_core::{log_op_end, log_op_error, log_op_start};

use crate::errors::{from_scene_error, Result};
use crate::scene::format_v0::SceneFileV0;
use crate::scene::{compute_scene_digest, parse_scene_file, parse_scene_str};

/// A scene ready to be walked, with the digest of the file it came from
#[derive(Debug)]
pub struct ImportedScene {
    pub graph: SceneGraph,
    pub digest: String,
}

/// Import a scene file
///
/// This is the main entry point for scene import. It:
/// 1. Parses and validates the scene YAML
/// 2. Computes the scene digest
/// 3. Creates nodes, then links children in declared order
/// 4. Applies locks and the selection
///
/// # Errors
///
/// Returns the first read, parse, validation or build error.
pub fn import_scene(path: &Path) -> Result<ImportedScene> {
    let started = std::time::Instant::now();
    log_op_start!("scene_import", path = %path.display());

    let result = parse_scene_file(path).and_then(|file| build(&file));
    finish(result, started)
}

/// Import a scene from YAML text
///
/// # Errors
///
/// As `import_scene`, minus read errors.
pub fn import_scene_str(content: &str) -> Result<ImportedScene> {
    let started = std::time::Instant::now();
    log_op_start!("scene_import");

    let result = parse_scene_str(content).and_then(|file| build(&file));
    finish(result, started)
}

fn finish(result: Result<ImportedScene>, started: std::time::Instant) -> Result<ImportedScene> {
    let duration_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(imported) => {
            log_op_end!(
                "scene_import",
                duration_ms = duration_ms,
                nodes = imported.graph.len(),
                digest = imported.digest.as_str(),
            );
        }
        Err(err) => {
            log_op_error!("scene_import", err.clone(), duration_ms = duration_ms);
        }
    }
    result
}

fn build(file: &SceneFileV0) -> Result<ImportedScene> {
    let digest = compute_scene_digest(file)?;
    let mut graph = SceneGraph::new(file.scene.name.clone());

    for node in &file.nodes {
        graph
            .add_node(node.id.clone(), node.local_transform())
            .map_err(from_scene_error)?;
        if node.locked {
            graph
                .set_locked(&node.id, true)
                .map_err(from_scene_error)?;
        }
    }

    for node in &file.nodes {
        for child in &node.children {
            graph.attach(&node.id, child).map_err(from_scene_error)?;
        }
    }

    for selected in &file.selection {
        graph.select(selected).map_err(from_scene_error)?;
    }

    Ok(ImportedScene { graph, digest })
}
