//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Node model, source metadata and the digest result
//! - Fatal errors and traversal warnings
//! - Text/binary classification and encoding fallback reading
//! - Notebook conversion
//! - Section formatters and the output renderer
//! - Token counting for LLM context budgeting

pub mod config;
pub mod error;
pub mod file_reader;
pub mod formatters;
pub mod model;
pub mod notebook;
pub mod paths;
pub mod render;
pub mod tokenizer;
pub mod util;
pub mod warning;
