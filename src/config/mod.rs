//! # Configuration Module
//!
//! Owns the panel's configuration tree and its durable persistence. The
//! tree is the single source of truth for what the panel can control:
//!
//! ```text
//! config/
//! ├── model.rs - Location → Endpoint → Function tree types
//! ├── store.rs - owning store, validated mutation, atomic snapshots
//! └── error.rs - configuration error taxonomy
//! ```
//!
//! ## Persistence Model
//!
//! The whole tree is serialized as one JSON document and rewritten on every
//! mutation (write-through, no write-behind). Missing configuration
//! gracefully opens as an empty tree so a fresh install works without
//! setup; a corrupt document is surfaced to the caller and never silently
//! discarded. Connection state is deliberately not part of this module;
//! nothing about the broker session survives the process.
//!
//! ## Mutation Model
//!
//! Entries are created and removed only through the store's validated
//! methods; there is no update-in-place. New functions arrive as a typed
//! [`store::FunctionDraft`] so input collection stays decoupled from
//! validation and persistence.

pub mod error;
pub mod model;
pub mod store;

pub use error::ConfigError;
pub use model::{Endpoint, Function, FunctionKind, Location};
pub use store::{ConfigStore, FunctionDraft};
