use super::backend::StorageBackend;
use crate::error::{BurrowError, Result};
use crate::model::{ApplicationsFile, Database};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory storage backend for testing.
///
/// Uses `parking_lot::Mutex` for interior mutability so the backend stays
/// usable from concurrent store tests while the `StorageBackend` trait keeps
/// `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    applications: Mutex<ApplicationsFile>,
    db_maps: Mutex<HashMap<Uuid, HashMap<Uuid, Database>>>,
    document_maps: Mutex<HashMap<(Uuid, Uuid), HashMap<String, Uuid>>>,
    content: Mutex<HashMap<(Uuid, Uuid, Uuid), Vec<u8>>>,
    simulate_write_error: Mutex<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.lock() = simulate;
    }

    fn check_writeable(&self) -> Result<()> {
        if *self.simulate_write_error.lock() {
            return Err(BurrowError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn load_applications(&self) -> Result<ApplicationsFile> {
        Ok(self.applications.lock().clone())
    }

    fn save_applications(&self, file: &ApplicationsFile) -> Result<()> {
        self.check_writeable()?;
        *self.applications.lock() = file.clone();
        Ok(())
    }

    fn load_db_map(&self, application: Uuid) -> Result<HashMap<Uuid, Database>> {
        let maps = self.db_maps.lock();
        Ok(maps.get(&application).cloned().unwrap_or_default())
    }

    fn save_db_map(&self, application: Uuid, map: &HashMap<Uuid, Database>) -> Result<()> {
        self.check_writeable()?;
        self.db_maps.lock().insert(application, map.clone());
        Ok(())
    }

    fn load_document_map(
        &self,
        application: Uuid,
        database: Uuid,
    ) -> Result<HashMap<String, Uuid>> {
        let maps = self.document_maps.lock();
        Ok(maps.get(&(application, database)).cloned().unwrap_or_default())
    }

    fn save_document_map(
        &self,
        application: Uuid,
        database: Uuid,
        map: &HashMap<String, Uuid>,
    ) -> Result<()> {
        self.check_writeable()?;
        self.document_maps
            .lock()
            .insert((application, database), map.clone());
        Ok(())
    }

    fn read_content(
        &self,
        application: Uuid,
        database: Uuid,
        document: Uuid,
    ) -> Result<Option<Vec<u8>>> {
        let content = self.content.lock();
        Ok(content.get(&(application, database, document)).cloned())
    }

    fn write_content(
        &self,
        application: Uuid,
        database: Uuid,
        document: Uuid,
        bytes: &[u8],
    ) -> Result<()> {
        self.check_writeable()?;
        self.content
            .lock()
            .insert((application, database, document), bytes.to_vec());
        Ok(())
    }

    fn delete_content(&self, application: Uuid, database: Uuid, document: Uuid) -> Result<()> {
        self.content.lock().remove(&(application, database, document));
        Ok(())
    }

    fn remove_database_dir(&self, application: Uuid, database: Uuid) -> Result<()> {
        self.document_maps.lock().remove(&(application, database));
        self.content
            .lock()
            .retain(|(app, db, _), _| !(*app == application && *db == database));
        Ok(())
    }

    fn remove_application_dir(&self, application: Uuid) -> Result<()> {
        self.db_maps.lock().remove(&application);
        self.document_maps
            .lock()
            .retain(|(app, _), _| *app != application);
        self.content
            .lock()
            .retain(|(app, _, _), _| *app != application);
        Ok(())
    }
}
