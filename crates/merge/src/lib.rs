#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`MergeEngineError`)
//! - [`reconcile`]: Closed entity set (`EntityKind`) and pure reconciliation
//! - [`graph`]: Graph union and root consolidation
//! - [`engine`]: Merge orchestration (`MergeEngine`, `MergeOptions`)
//!
//! # Architecture
//!
//! ```text
//! tokens --> DocumentStore (resolve) --> [Document, Document, ...]
//!                                               |
//!                                      merge_metadata (scalars,
//!                                      tools/authors/types keyed)
//!                                               |
//!                                      union_graphs (nodes by id,
//!                                      edges by (kind, from))
//!                                               |
//!                                      consolidate_roots (synthetic
//!                                      root, repoint, drop loops)
//!                                               |
//!                            DocumentStore (persist + tags, one tx)
//! ```

pub mod engine;
pub mod error;
pub mod graph;
pub mod reconcile;

// --- Public API Re-exports ---

// Engine (main entry point)
pub use engine::{MergeEngine, MergeOptions};

// Reconciliation
pub use reconcile::{EntityKind, Reconcile, merge_keyed, merge_metadata};

// Graph transforms
pub use graph::{consolidate_roots, union_graphs};

// Error
pub use error::MergeEngineError;
