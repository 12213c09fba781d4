//! # Storage Layer
//!
//! This module holds the whole persistence and indexing layer. The
//! [`StorageBackend`] trait abstracts raw I/O so the store logic can run
//! against different backends.
//!
//! ## Design Rationale
//!
//! Storage is split in two:
//! - [`backend::StorageBackend`] answers *how* bytes get to disk: side-car
//!   index files and content files, nothing else. It knows no entity
//!   relationships and holds no locks.
//! - [`doc_store::DocStore`] answers *what* the store means: the resident
//!   in-memory index, id allocation, cascading deletes, and the locking
//!   discipline that keeps concurrent operations consistent.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production file-based storage
//!   - Store-wide index in `applications.json`
//!   - Per-application database maps and per-database document maps in
//!     `map.json` side-cars
//!   - Document content in individual files named by stable id
//!   - All writes are temp-file-then-rename
//!
//! - [`mem_backend::MemBackend`]: in-memory storage for testing
//!   - No persistence
//!   - Write-error simulation for failure-path tests
//!
//! ## Storage Format
//!
//! For `FsBackend`:
//! ```text
//! <root>/
//! ├── applications.json         # All applications and tokens
//! └── db/
//!     └── <applicationId>/
//!         ├── map.json          # databaseId → {id, application, path}
//!         └── <databaseId>/
//!             ├── map.json      # documentName → documentId
//!             └── <documentId>  # raw document bytes
//! ```
//!
//! Index files are stored separately from content so the store can rebuild
//! its name/path mappings at startup without scanning content files.

pub mod backend;
pub mod doc_store;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::StorageBackend;
pub use doc_store::DocStore;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
