pub mod node;
pub mod vector;

pub use node::{Node, NodeAttributes};
pub use vector::{LocalTransform, Mat3, Vec3, WorldTransform};
