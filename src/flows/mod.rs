//! Flows module - Operations combining traversal and rendering
//!
//! Provides:
//! - digest: Build the summary, tree and content of a directory or file

pub mod digest;
