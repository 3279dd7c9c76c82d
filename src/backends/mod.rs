//! Backends module - Filesystem traversal
//!
//! Provides:
//! - filter: Exclude/include patterns and hidden-entry filtering
//! - scan: Tree building with walkdir

pub mod filter;
pub mod scan;
