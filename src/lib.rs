//! repodigest - Repository digestion engine
//!
//! Builds an in-memory tree of a directory, classifies and decodes every file,
//! and renders a summary, an ASCII tree and a concatenated content dump sized
//! for LLM prompts.
//!
//! ```no_run
//! use repodigest::{ingest, DigestOptions};
//!
//! let digest = ingest(&DigestOptions::new("path/to/project"))?;
//! println!("{}\n\n{}\n{}", digest.summary, digest.tree, digest.content);
//! # Ok::<(), repodigest::DigestError>(())
//! ```

pub mod backends;
pub mod core;
pub mod flows;

pub use crate::core::error::{DigestError, Result};
pub use crate::core::model::{Digest, FileSystemNode, SourceMeta};
pub use crate::flows::digest::{ingest, DigestOptions};
