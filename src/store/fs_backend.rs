use super::backend::StorageBackend;
use crate::config::StoreConfig;
use crate::error::{BurrowError, Result};
use crate::model::{ApplicationsFile, Database};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const APPLICATIONS_FILE: &str = "applications.json";
const DB_DIR: &str = "db";
const MAP_FILE: &str = "map.json";

/// Production filesystem backend.
///
/// On-disk layout:
/// ```text
/// <root>/applications.json                — {"applications": [...], "tokens": [...]}
/// <root>/db/<appId>/map.json              — {databaseId: {id, application, path}, ...}
/// <root>/db/<appId>/<dbId>/map.json       — {documentName: documentId, ...}
/// <root>/db/<appId>/<dbId>/<documentId>   — raw document bytes
/// ```
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.root.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn applications_path(&self) -> PathBuf {
        self.root.join(APPLICATIONS_FILE)
    }

    fn app_dir(&self, application: Uuid) -> PathBuf {
        self.root.join(DB_DIR).join(application.to_string())
    }

    fn db_dir(&self, application: Uuid, database: Uuid) -> PathBuf {
        self.app_dir(application).join(database.to_string())
    }

    fn content_path(&self, application: Uuid, database: Uuid, document: Uuid) -> PathBuf {
        self.db_dir(application, database).join(document.to_string())
    }

    fn ensure_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(BurrowError::Io)?;
        }
        Ok(())
    }

    /// Write to a uniquely-named temp file in the target directory and
    /// rename over the target, so a crash never leaves a half-written file.
    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| BurrowError::Store(format!("no parent directory: {}", path.display())))?;
        Self::ensure_dir(dir)?;

        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("file");
        let tmp = dir.join(format!(".{}-{}.tmp", name, Uuid::new_v4()));
        fs::write(&tmp, bytes).map_err(BurrowError::Io)?;
        fs::rename(&tmp, path).map_err(BurrowError::Io)?;
        Ok(())
    }

    fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value).map_err(BurrowError::Serialization)?;
        Self::write_atomic(path, content.as_bytes())
    }
}

impl StorageBackend for FsBackend {
    fn load_applications(&self) -> Result<ApplicationsFile> {
        let path = self.applications_path();
        if !path.exists() {
            let empty = ApplicationsFile::default();
            self.save_applications(&empty)?;
            return Ok(empty);
        }
        let content = fs::read_to_string(&path).map_err(BurrowError::Io)?;
        serde_json::from_str(&content).map_err(BurrowError::Serialization)
    }

    fn save_applications(&self, file: &ApplicationsFile) -> Result<()> {
        Self::write_json(&self.applications_path(), file)
    }

    fn load_db_map(&self, application: Uuid) -> Result<HashMap<Uuid, Database>> {
        let path = self.app_dir(application).join(MAP_FILE);
        if !path.exists() {
            self.save_db_map(application, &HashMap::new())?;
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&path).map_err(BurrowError::Io)?;
        serde_json::from_str(&content).map_err(BurrowError::Serialization)
    }

    fn save_db_map(&self, application: Uuid, map: &HashMap<Uuid, Database>) -> Result<()> {
        Self::write_json(&self.app_dir(application).join(MAP_FILE), map)
    }

    fn load_document_map(
        &self,
        application: Uuid,
        database: Uuid,
    ) -> Result<HashMap<String, Uuid>> {
        let path = self.db_dir(application, database).join(MAP_FILE);
        if !path.exists() {
            self.save_document_map(application, database, &HashMap::new())?;
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&path).map_err(BurrowError::Io)?;
        serde_json::from_str(&content).map_err(BurrowError::Serialization)
    }

    fn save_document_map(
        &self,
        application: Uuid,
        database: Uuid,
        map: &HashMap<String, Uuid>,
    ) -> Result<()> {
        Self::write_json(&self.db_dir(application, database).join(MAP_FILE), map)
    }

    fn read_content(
        &self,
        application: Uuid,
        database: Uuid,
        document: Uuid,
    ) -> Result<Option<Vec<u8>>> {
        let path = self.content_path(application, database, document);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(BurrowError::Io)?;
        Ok(Some(bytes))
    }

    fn write_content(
        &self,
        application: Uuid,
        database: Uuid,
        document: Uuid,
        bytes: &[u8],
    ) -> Result<()> {
        Self::write_atomic(&self.content_path(application, database, document), bytes)
    }

    fn delete_content(&self, application: Uuid, database: Uuid, document: Uuid) -> Result<()> {
        let path = self.content_path(application, database, document);
        if path.exists() {
            fs::remove_file(&path).map_err(BurrowError::Io)?;
        }
        Ok(())
    }

    fn remove_database_dir(&self, application: Uuid, database: Uuid) -> Result<()> {
        let dir = self.db_dir(application, database);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(BurrowError::Io)?;
        }
        Ok(())
    }

    fn remove_application_dir(&self, application: Uuid) -> Result<()> {
        let dir = self.app_dir(application);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(BurrowError::Io)?;
        }
        Ok(())
    }
}
