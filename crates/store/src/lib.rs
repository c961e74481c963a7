#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`StoreError`)
//! - [`config`]: Store configuration (`DocumentStoreConfig`, builder, `JournalMode`)
//! - [`store`]: Core document persistence (`DocumentStore`, schema, transactions)
//! - [`annotation`]: Unique/multi-valued annotation operations
//! - [`alias`]: Alias registration, token resolution, tags
//! - [`lineage`]: Revision chains (`add_revision`, root/latest walks)
//! - [`ingest`]: Raw source intake and export through the codec seam
//!
//! # Architecture
//!
//! ```text
//! SourcePayload --> DocumentDecoder --> Document
//!                                          |
//!                                    DocumentStore
//!                                    /     |      \
//!                              documents  annotations  (SQLite)
//!                                    \     |      /
//!                         alias / tags / lineage / provenance
//!                                          |
//!                                   DocumentEncoder --> bytes
//! ```

pub mod alias;
pub mod annotation;
pub mod config;
pub mod error;
pub mod ingest;
pub mod lineage;
pub mod store;

// --- Public API Re-exports ---

// Store (main entry point)
pub use store::DocumentStore;

// Configuration
pub use config::{DocumentStoreConfig, DocumentStoreConfigBuilder, IN_MEMORY_DB, JournalMode};

// Error
pub use error::StoreError;
