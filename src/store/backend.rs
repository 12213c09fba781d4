use crate::error::Result;
use crate::model::{ApplicationsFile, Database};
use std::collections::HashMap;
use uuid::Uuid;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`DocStore`](super::DocStore) handles the "what" (index bookkeeping,
/// cascades, locking).
pub trait StorageBackend {
    // --- Side-car Index Files ---

    /// Load the store-wide applications file (applications + tokens).
    /// If absent, writes an empty default file and returns empty data, so a
    /// store bootstraps from a completely empty directory. Malformed content
    /// is an error, never silently discarded.
    fn load_applications(&self) -> Result<ApplicationsFile>;

    /// Save the applications file. Serializes the entire state, no diffs.
    fn save_applications(&self, file: &ApplicationsFile) -> Result<()>;

    /// Load one application's database map, keyed by database id.
    /// Same absent-file bootstrap behavior as `load_applications`.
    fn load_db_map(&self, application: Uuid) -> Result<HashMap<Uuid, Database>>;

    /// Save one application's database map.
    fn save_db_map(&self, application: Uuid, map: &HashMap<Uuid, Database>) -> Result<()>;

    /// Load one database's document map (name → document id).
    /// Same absent-file bootstrap behavior as `load_applications`.
    fn load_document_map(&self, application: Uuid, database: Uuid)
        -> Result<HashMap<String, Uuid>>;

    /// Save one database's document map.
    fn save_document_map(
        &self,
        application: Uuid,
        database: Uuid,
        map: &HashMap<String, Uuid>,
    ) -> Result<()>;

    // --- Content Operations ---

    /// Read raw content bytes for a document.
    /// Returns Ok(None) if the file does not exist; the caller decides
    /// whether that is NotFound or an index/storage divergence.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read_content(&self, application: Uuid, database: Uuid, document: Uuid)
        -> Result<Option<Vec<u8>>>;

    /// Write content bytes, creating parent directories as needed and
    /// overwriting unconditionally.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write_content(
        &self,
        application: Uuid,
        database: Uuid,
        document: Uuid,
        bytes: &[u8],
    ) -> Result<()>;

    /// Delete a content file. Absent files are not an error.
    fn delete_content(&self, application: Uuid, database: Uuid, document: Uuid) -> Result<()>;

    // --- Recursive Removal ---

    /// Remove one database's directory subtree (document map and contents).
    fn remove_database_dir(&self, application: Uuid, database: Uuid) -> Result<()>;

    /// Remove one application's directory subtree (all databases).
    fn remove_application_dir(&self, application: Uuid) -> Result<()>;
}
