//! Transformation module.
//!
//! - Rows: per-row validation, discount arithmetic and report writing
//! - Pipeline: async wrappers that run the transform off the event loop

pub mod pipeline;
pub mod rows;

pub use pipeline::*;
pub use rows::*;
