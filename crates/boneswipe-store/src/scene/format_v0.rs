//! Scene Format v0 schema
//!
//! Defines the YAML structure of a scene file

use boneswipe_core::model::LocalTransform;
use boneswipe_core::Vec3;
use serde::{Deserialize, Serialize};

/// Top-level scene file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFileV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    pub scene: SceneMeta,

    /// Every node in the scene, each listing its ordered children
    pub nodes: Vec<SceneNodeV0>,

    /// Selected node ids, first one is the default walk root
    #[serde(default)]
    pub selection: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneMeta {
    pub name: String,
}

/// Node definition in a scene file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneNodeV0 {
    pub id: String,

    #[serde(default)]
    pub translate: Vec3,

    /// Euler XYZ, degrees
    #[serde(default)]
    pub rotate: Vec3,

    #[serde(default = "unit_scale")]
    pub scale: Vec3,

    #[serde(default)]
    pub joint_orient: Vec3,

    /// Locked nodes reject orientation changes
    #[serde(default)]
    pub locked: bool,

    #[serde(default)]
    pub children: Vec<String>,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl SceneNodeV0 {
    pub fn local_transform(&self) -> LocalTransform {
        LocalTransform {
            translate: self.translate,
            rotate: self.rotate,
            scale: self.scale,
            joint_orient: self.joint_orient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_scene() {
        let yaml = r#"
schema_version: 0
scene:
  name: rig
nodes:
  - id: hips
"#;

        let file: SceneFileV0 = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.schema_version, 0);
        assert_eq!(file.scene.name, "rig");
        assert_eq!(file.nodes.len(), 1);
        assert_eq!(file.nodes[0].scale, Vec3::ONE);
        assert_eq!(file.nodes[0].translate, Vec3::ZERO);
        assert!(file.nodes[0].children.is_empty());
        assert!(file.selection.is_empty());
    }

    #[test]
    fn test_transform_fields() {
        let yaml = r#"
schema_version: 0
scene:
  name: rig
nodes:
  - id: hips
    translate: [0, 90.5, 0]
    rotate: [10, 0, -5]
    joint_orient: [0, 0, 90]
    locked: true
"#;

        let file: SceneFileV0 = serde_yaml::from_str(yaml).unwrap();
        let local = file.nodes[0].local_transform();
        assert_eq!(local.translate, Vec3::new(0.0, 90.5, 0.0));
        assert_eq!(local.rotate, Vec3::new(10.0, 0.0, -5.0));
        assert_eq!(local.joint_orient, Vec3::new(0.0, 0.0, 90.0));
        assert!(file.nodes[0].locked);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
schema_version: 0
scene:
  name: rig
nodes:
  - id: hips
    rotation: [0, 0, 0]
"#;

        assert!(serde_yaml::from_str::<SceneFileV0>(yaml).is_err());
    }
}
