//! Scene digest canonicalization
//!
//! Computes stable SHA256 digests of scenes so a walk report can name the
//! exact scene it ran on

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::{serialization_error, Result};
use crate::scene::format_v0::SceneFileV0;

/// Canonical representation of a scene for digest calculation
#[derive(Debug, Clone, Serialize)]
struct CanonicalScene {
    schema_version: u32,
    scene_name: String,
    nodes: Vec<CanonicalNode>,
    selection: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct CanonicalNode {
    id: String,
    translate: [f64; 3],
    rotate: [f64; 3],
    scale: [f64; 3],
    joint_orient: [f64; 3],
    locked: bool,
    /// Order matters: it is the walk order
    children: Vec<String>,
}

/// Compute a stable digest for a scene
///
/// Node declaration order does not affect the digest; child order and
/// selection order do.
///
/// # Errors
///
/// Returns a `Serialization` error if the canonical form cannot be encoded.
pub fn compute_scene_digest(file: &SceneFileV0) -> Result<String> {
    let canonical = canonicalize_scene(file);

    let json = serde_json::to_string(&canonical)
        .map_err(|e| serialization_error("scene_digest", e))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

fn canonicalize_scene(file: &SceneFileV0) -> CanonicalScene {
    let mut nodes: Vec<CanonicalNode> = file
        .nodes
        .iter()
        .map(|n| CanonicalNode {
            id: n.id.clone(),
            translate: n.translate.into(),
            rotate: n.rotate.into(),
            scale: n.scale.into(),
            joint_orient: n.joint_orient.into(),
            locked: n.locked,
            children: n.children.clone(),
        })
        .collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    CanonicalScene {
        schema_version: file.schema_version,
        scene_name: file.scene.name.clone(),
        nodes,
        selection: file.selection.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::parse_scene_str;

    const A: &str = r#"
schema_version: 0
scene:
  name: rig
nodes:
  - id: hips
    children: [l_leg, r_leg]
  - id: l_leg
  - id: r_leg
"#;

    #[test]
    fn test_digest_is_hex_sha256() {
        let digest = compute_scene_digest(&parse_scene_str(A).unwrap()).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_declaration_order_does_not_matter() {
        let reordered = r#"
schema_version: 0
scene:
  name: rig
nodes:
  - id: r_leg
  - id: l_leg
  - id: hips
    children: [l_leg, r_leg]
"#;
        let a = compute_scene_digest(&parse_scene_str(A).unwrap()).unwrap();
        let b = compute_scene_digest(&parse_scene_str(reordered).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_child_order_matters() {
        let swapped = A.replace("[l_leg, r_leg]", "[r_leg, l_leg]");
        let a = compute_scene_digest(&parse_scene_str(A).unwrap()).unwrap();
        let b = compute_scene_digest(&parse_scene_str(&swapped).unwrap()).unwrap();
        assert_ne!(a, b);
    }
}
