//! # Burrow Architecture
//!
//! Burrow is a **multi-tenant hierarchical document store**, shipped as a
//! library: embedding processes (an HTTP server, a CLI, a test harness) own
//! a store instance and call its operations; nothing in here touches a
//! network, parses credentials, or prints.
//!
//! ## The Two-Layer Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Store Facade (store/doc_store.rs)                          │
//! │  - The public operations: applications, tokens, databases,  │
//! │    documents                                                │
//! │  - Owns the resident in-memory index and the lock discipline│
//! │  - Persists side-car files before committing index changes  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Backend (store/backend.rs)                         │
//! │  - Raw side-car and content I/O behind a trait              │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Id System
//!
//! Every entity gets a stable uuid decoupled from its human-chosen name or
//! path. Content files are named by document id, so documents can carry
//! names that are unsafe as filenames and can be renamed without moving
//! bytes. Side-car `map.json` files record the name/path → id mappings and
//! are the only thing read at startup.
//!
//! ## Key Principle: Persist Before Commit
//!
//! Every mutation writes the affected side-car file (and content file)
//! before the in-memory index changes. A failed write surfaces as an error
//! with the index still matching what is on disk; the two never diverge
//! after a successful return.
//!
//! ## Module Overview
//!
//! - [`store`]: the storage backend trait, both backends, and the store
//!   facade — entry point for all operations
//! - [`model`]: core entity types (`Application`, `Token`, `Database`)
//! - [`config`]: store root configuration
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod model;
pub mod store;
