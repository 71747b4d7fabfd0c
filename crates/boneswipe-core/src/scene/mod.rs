//! In-memory scene host
//!
//! `SceneGraph` implements `TreeAccess`, `ActionEffector` and `Selection`, so
//! a walk can run end to end without an external application.

pub mod graph;

pub use graph::{Marker, SceneError, SceneGraph};
