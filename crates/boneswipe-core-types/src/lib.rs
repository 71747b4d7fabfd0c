//! Core types shared across boneswipe crates
//!
//! This crate provides foundational types used by the engine, the error
//! facility and the logging facility:
//!
//! - **Correlation types**: RunId, RunContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RunContext, RunId};
