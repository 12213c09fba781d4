use super::backend::StorageBackend;
use crate::error::{BurrowError, Result};
use crate::model::{Application, ApplicationsFile, Database, Token};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const ROOT_PATH: &str = "/";

/// Document name → stable content id.
type DocumentMap = HashMap<String, Uuid>;

/// One application's database scope. The primary map is path-keyed; the
/// id→path reverse index is kept bijective with it so delete-by-id never
/// scans. Each database carries its own lock so document operations on
/// disjoint databases proceed in parallel.
#[derive(Default)]
struct AppScope {
    databases: Mutex<DatabaseMap>,
}

#[derive(Default)]
struct DatabaseMap {
    by_path: HashMap<String, Database>,
    paths_by_id: HashMap<Uuid, String>,
    documents: HashMap<Uuid, Arc<Mutex<DocumentMap>>>,
}

impl DatabaseMap {
    /// Snapshot in the on-disk shape (keyed by database id).
    fn to_file(&self) -> HashMap<Uuid, Database> {
        self.by_path.values().map(|db| (db.id, db.clone())).collect()
    }
}

/// Store-wide registration state, guarded by one RwLock. Structural
/// application/token mutations take the write lock; everything else reads.
#[derive(Default)]
struct Registry {
    applications: HashMap<Uuid, Application>,
    tokens: HashMap<Uuid, Token>,
    scopes: HashMap<Uuid, Arc<AppScope>>,
}

impl Registry {
    fn scope(&self, application: Uuid) -> Result<&Arc<AppScope>> {
        self.scopes
            .get(&application)
            .ok_or(BurrowError::ApplicationNotFound(application))
    }

    /// Snapshot in the on-disk shape of applications.json.
    fn to_file(&self) -> ApplicationsFile {
        ApplicationsFile {
            applications: self.applications.values().cloned().collect(),
            tokens: self.tokens.values().cloned().collect(),
        }
    }
}

/// The store facade: the resident in-memory index plus every public
/// operation, generic over the storage backend.
///
/// All operations are synchronous and take `&self`; the index is guarded by
/// the registry RwLock, one mutex per application scope, and one mutex per
/// database. Lock order is always registry → application → database.
///
/// Mutations persist the affected side-car file *before* committing the
/// in-memory change, so a failed write leaves the index exactly as loaded
/// from disk.
pub struct DocStore<B: StorageBackend> {
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    registry: RwLock<Registry>,
}

impl<B: StorageBackend> DocStore<B> {
    /// Open a store over the backend, replaying the load protocol: the
    /// applications file, then each application's database map, then each
    /// database's document map. The whole index stays resident; there is no
    /// lazy loading. Malformed side-car files abort the open.
    pub fn open(backend: B) -> Result<Self> {
        let file = backend.load_applications()?;

        let mut registry = Registry::default();
        for app in file.applications {
            registry.scopes.insert(app.id, Arc::new(AppScope::default()));
            registry.applications.insert(app.id, app);
        }
        for token in file.tokens {
            registry.tokens.insert(token.id, token);
        }

        for (app_id, scope) in &registry.scopes {
            let db_map = backend.load_db_map(*app_id)?;
            let mut databases = scope.databases.lock();
            for (db_id, db) in db_map {
                let documents = backend.load_document_map(*app_id, db_id)?;
                databases.paths_by_id.insert(db_id, db.path.clone());
                databases
                    .documents
                    .insert(db_id, Arc::new(Mutex::new(documents)));
                databases.by_path.insert(db.path.clone(), db);
            }
        }

        info!(
            applications = registry.applications.len(),
            tokens = registry.tokens.len(),
            "store index loaded"
        );

        Ok(Self {
            backend,
            registry: RwLock::new(registry),
        })
    }

    // --- Applications ---

    pub fn create_application(&self, name: &str) -> Result<Application> {
        let mut registry = self.registry.write();
        let app = Application::new(name);

        let mut file = registry.to_file();
        file.applications.push(app.clone());
        self.backend.save_applications(&file)?;

        let scope = Arc::new(AppScope::default());
        registry.scopes.insert(app.id, Arc::clone(&scope));
        registry.applications.insert(app.id, app.clone());

        // Root database, created while the write lock is still held so no
        // reader can observe an application without its `/` database.
        self.create_database_in_scope(app.id, &scope, ROOT_PATH)?;

        debug!(application = %app.id, name, "application created");
        Ok(app)
    }

    pub fn get_application(&self, id: Uuid) -> Result<Application> {
        self.registry
            .read()
            .applications
            .get(&id)
            .cloned()
            .ok_or(BurrowError::ApplicationNotFound(id))
    }

    pub fn list_applications(&self) -> Vec<Application> {
        let registry = self.registry.read();
        let mut apps: Vec<Application> = registry.applications.values().cloned().collect();
        apps.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        apps
    }

    /// Delete an application and everything it owns: databases, documents,
    /// and every token referencing it. The full affected set is computed and
    /// persisted before anything is removed from disk.
    pub fn delete_application(&self, id: Uuid) -> Result<()> {
        let mut registry = self.registry.write();
        if !registry.applications.contains_key(&id) {
            return Err(BurrowError::ApplicationNotFound(id));
        }

        let dropped_tokens: Vec<Uuid> = registry
            .tokens
            .values()
            .filter(|token| token.application == id)
            .map(|token| token.id)
            .collect();

        let mut file = registry.to_file();
        file.applications.retain(|app| app.id != id);
        file.tokens.retain(|token| token.application != id);
        self.backend.save_applications(&file)?;

        registry.applications.remove(&id);
        for token_id in &dropped_tokens {
            registry.tokens.remove(token_id);
        }
        registry.scopes.remove(&id);

        self.backend.remove_application_dir(id)?;
        info!(application = %id, tokens = dropped_tokens.len(), "application deleted");
        Ok(())
    }

    // --- Tokens ---

    /// Create a token for an application. The application id is not checked
    /// for existence; resolving a dangling token later fails cleanly with
    /// `ApplicationNotFound`.
    pub fn create_token(&self, application: Uuid, writeable: bool) -> Result<Token> {
        let mut registry = self.registry.write();
        let token = Token::new(application, writeable);

        let mut file = registry.to_file();
        file.tokens.push(token.clone());
        self.backend.save_applications(&file)?;

        registry.tokens.insert(token.id, token.clone());
        debug!(token = %token.id, application = %application, writeable, "token created");
        Ok(token)
    }

    pub fn get_token(&self, id: Uuid) -> Result<Token> {
        self.registry
            .read()
            .tokens
            .get(&id)
            .cloned()
            .ok_or(BurrowError::TokenNotFound(id))
    }

    pub fn delete_token(&self, id: Uuid) -> Result<()> {
        let mut registry = self.registry.write();
        if !registry.tokens.contains_key(&id) {
            return Err(BurrowError::TokenNotFound(id));
        }

        let mut file = registry.to_file();
        file.tokens.retain(|token| token.id != id);
        self.backend.save_applications(&file)?;

        registry.tokens.remove(&id);
        debug!(token = %id, "token deleted");
        Ok(())
    }

    // --- Databases ---

    pub fn create_database(&self, application: Uuid, path: &str) -> Result<Database> {
        let registry = self.registry.read();
        let scope = registry.scope(application)?;
        self.create_database_in_scope(application, scope, path)
    }

    fn create_database_in_scope(
        &self,
        application: Uuid,
        scope: &AppScope,
        path: &str,
    ) -> Result<Database> {
        if !path.starts_with('/') {
            return Err(BurrowError::InvalidPath(path.to_string()));
        }

        let mut databases = scope.databases.lock();
        if databases.by_path.contains_key(path) {
            return Err(BurrowError::PathConflict(path.to_string()));
        }

        let db = Database::new(application, path);

        let mut file = databases.to_file();
        file.insert(db.id, db.clone());
        self.backend.save_db_map(application, &file)?;
        self.backend
            .save_document_map(application, db.id, &DocumentMap::new())?;

        databases.paths_by_id.insert(db.id, db.path.clone());
        databases
            .documents
            .insert(db.id, Arc::new(Mutex::new(DocumentMap::new())));
        databases.by_path.insert(db.path.clone(), db.clone());

        debug!(application = %application, database = %db.id, path, "database created");
        Ok(db)
    }

    /// Delete a database and its documents. Holds the database's own lock
    /// across the removal so in-flight document operations drain first.
    pub fn delete_database(&self, application: Uuid, database: Uuid) -> Result<()> {
        let registry = self.registry.read();
        let scope = registry.scope(application)?;
        let mut databases = scope.databases.lock();

        let path = databases
            .paths_by_id
            .get(&database)
            .cloned()
            .ok_or(BurrowError::DatabaseNotFound(database))?;
        let documents = databases
            .documents
            .get(&database)
            .cloned()
            .ok_or(BurrowError::DatabaseNotFound(database))?;
        let _documents = documents.lock();

        let mut file = databases.to_file();
        file.remove(&database);
        self.backend.save_db_map(application, &file)?;

        databases.by_path.remove(&path);
        databases.paths_by_id.remove(&database);
        databases.documents.remove(&database);

        self.backend.remove_database_dir(application, database)?;
        debug!(application = %application, database = %database, path = %path, "database deleted");
        Ok(())
    }

    /// List databases whose path starts with `path_prefix`. Non-recursive
    /// listing keeps the prefix database itself and its direct children:
    /// paths with no `/` beyond the prefix separator.
    pub fn list_databases(
        &self,
        application: Uuid,
        path_prefix: &str,
        recursive: bool,
    ) -> Result<Vec<Database>> {
        let registry = self.registry.read();
        let scope = registry.scope(application)?;
        let databases = scope.databases.lock();

        let mut matched: Vec<Database> = databases
            .by_path
            .iter()
            .filter(|(path, _)| path.starts_with(path_prefix))
            .filter(|(path, _)| recursive || is_direct_child(path_prefix, path))
            .map(|(_, db)| db.clone())
            .collect();
        matched.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(matched)
    }

    // --- Documents ---

    /// Create-or-replace a document. For a new name the id allocation, the
    /// content write, and the document map persist all run under the
    /// database lock, so two racing writers for the same new name resolve
    /// to a single id.
    pub fn update_document(
        &self,
        application: Uuid,
        database: Uuid,
        name: &str,
        contents: &[u8],
    ) -> Result<()> {
        let registry = self.registry.read();
        let scope = registry.scope(application)?;
        let documents = documents_for(scope, database)?;
        let mut documents = documents.lock();

        match documents.get(name).copied() {
            Some(id) => {
                self.backend.write_content(application, database, id, contents)?;
            }
            None => {
                let id = Uuid::new_v4();
                self.backend.write_content(application, database, id, contents)?;

                let mut map = documents.clone();
                map.insert(name.to_string(), id);
                self.backend.save_document_map(application, database, &map)?;

                documents.insert(name.to_string(), id);
                debug!(application = %application, database = %database, name, document = %id, "document created");
            }
        }
        Ok(())
    }

    /// Read a document's content. An unknown name is NotFound; an indexed
    /// name whose content file is missing is an integrity violation, since
    /// it means a prior partial write.
    pub fn read_document(&self, application: Uuid, database: Uuid, name: &str) -> Result<Vec<u8>> {
        let registry = self.registry.read();
        let scope = registry.scope(application)?;
        let documents = documents_for(scope, database)?;
        let documents = documents.lock();

        let id = *documents
            .get(name)
            .ok_or_else(|| BurrowError::DocumentNotFound(name.to_string()))?;

        self.backend
            .read_content(application, database, id)?
            .ok_or_else(|| {
                warn!(application = %application, database = %database, document = %id, "indexed document has no content file");
                BurrowError::Integrity(format!(
                    "document '{}' ({}) is indexed but has no content file",
                    name, id
                ))
            })
    }

    /// Delete a document and return the content that was present. The map
    /// is persisted without the name before the content file is removed, so
    /// the index never references a deleted file.
    pub fn delete_document(
        &self,
        application: Uuid,
        database: Uuid,
        name: &str,
    ) -> Result<Vec<u8>> {
        let registry = self.registry.read();
        let scope = registry.scope(application)?;
        let documents = documents_for(scope, database)?;
        let mut documents = documents.lock();

        let id = *documents
            .get(name)
            .ok_or_else(|| BurrowError::DocumentNotFound(name.to_string()))?;

        let contents = self
            .backend
            .read_content(application, database, id)?
            .ok_or_else(|| {
                BurrowError::Integrity(format!(
                    "document '{}' ({}) is indexed but has no content file",
                    name, id
                ))
            })?;

        let mut map = documents.clone();
        map.remove(name);
        self.backend.save_document_map(application, database, &map)?;

        documents.remove(name);
        self.backend.delete_content(application, database, id)?;

        debug!(application = %application, database = %database, name, document = %id, "document deleted");
        Ok(contents)
    }

    pub fn list_documents(&self, application: Uuid, database: Uuid) -> Result<Vec<String>> {
        let registry = self.registry.read();
        let scope = registry.scope(application)?;
        let documents = documents_for(scope, database)?;
        let documents = documents.lock();

        let mut names: Vec<String> = documents.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    pub fn document_exists(&self, application: Uuid, database: Uuid, name: &str) -> Result<bool> {
        let registry = self.registry.read();
        let scope = registry.scope(application)?;
        let documents = documents_for(scope, database)?;
        let documents = documents.lock();
        Ok(documents.contains_key(name))
    }

    // --- Lifecycle ---

    /// Rewrite every side-car file from the in-memory state. The teardown
    /// half of the open/flush lifecycle; also usable after restoring a
    /// backup directory.
    pub fn flush(&self) -> Result<()> {
        let registry = self.registry.read();
        self.backend.save_applications(&registry.to_file())?;

        for (app_id, scope) in &registry.scopes {
            let databases = scope.databases.lock();
            self.backend.save_db_map(*app_id, &databases.to_file())?;
            for (db_id, documents) in &databases.documents {
                self.backend
                    .save_document_map(*app_id, *db_id, &*documents.lock())?;
            }
        }
        debug!("store flushed");
        Ok(())
    }
}

fn documents_for(scope: &AppScope, database: Uuid) -> Result<Arc<Mutex<DocumentMap>>> {
    let databases = scope.databases.lock();
    databases
        .documents
        .get(&database)
        .cloned()
        .ok_or(BurrowError::DatabaseNotFound(database))
}

fn is_direct_child(prefix: &str, path: &str) -> bool {
    let rest = &path[prefix.len()..];
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    !rest.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    fn make_store() -> DocStore<MemBackend> {
        DocStore::open(MemBackend::new()).unwrap()
    }

    // --- Applications ---

    #[test]
    fn test_create_application_registers_root_database() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();

        let dbs = store.list_databases(app.id, "/", true).unwrap();
        assert_eq!(dbs.len(), 1);
        assert_eq!(dbs[0].path, "/");
        assert_eq!(dbs[0].application, app.id);
    }

    #[test]
    fn test_get_application() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();

        assert_eq!(store.get_application(app.id).unwrap(), app);

        let missing = Uuid::new_v4();
        match store.get_application(missing) {
            Err(BurrowError::ApplicationNotFound(id)) => assert_eq!(id, missing),
            other => panic!("expected ApplicationNotFound, got {:?}", other.map(|a| a.id)),
        }
    }

    #[test]
    fn test_list_applications() {
        let store = make_store();
        store.create_application("beta").unwrap();
        store.create_application("alpha").unwrap();

        let names: Vec<String> = store
            .list_applications()
            .into_iter()
            .map(|app| app.name)
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_application_names_are_not_unique() {
        let store = make_store();
        let a = store.create_application("same").unwrap();
        let b = store.create_application("same").unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.list_applications().len(), 2);
    }

    #[test]
    fn test_delete_application_not_found() {
        let store = make_store();
        let id = Uuid::new_v4();
        match store.delete_application(id) {
            Err(BurrowError::ApplicationNotFound(err_id)) => assert_eq!(err_id, id),
            _ => panic!("expected ApplicationNotFound"),
        }
    }

    #[test]
    fn test_delete_application_cascades() {
        let store = make_store();
        let app = store.create_application("doomed").unwrap();
        let db = store.create_database(app.id, "/notes").unwrap();
        store
            .update_document(app.id, db.id, "note", b"content")
            .unwrap();
        let token = store.create_token(app.id, true).unwrap();
        let other = store.create_application("survivor").unwrap();
        let other_token = store.create_token(other.id, false).unwrap();

        store.delete_application(app.id).unwrap();

        assert!(store.get_application(app.id).is_err());
        assert!(store.get_token(token.id).is_err());
        assert!(store.list_databases(app.id, "/", true).is_err());
        assert!(store.read_document(app.id, db.id, "note").is_err());

        // Unrelated state survives.
        assert!(store.get_application(other.id).is_ok());
        assert_eq!(store.get_token(other_token.id).unwrap().application, other.id);
    }

    #[test]
    fn test_create_application_write_failure_leaves_index_unchanged() {
        let store = make_store();
        store.backend.set_simulate_write_error(true);

        assert!(store.create_application("nope").is_err());

        store.backend.set_simulate_write_error(false);
        assert!(store.list_applications().is_empty());
    }

    // --- Tokens ---

    #[test]
    fn test_create_token_skips_application_check() {
        let store = make_store();
        let dangling = Uuid::new_v4();

        let token = store.create_token(dangling, false).unwrap();
        assert_eq!(token.application, dangling);
        assert!(!token.writeable);

        // The dangling reference fails cleanly at resolution time.
        match store.get_application(token.application) {
            Err(BurrowError::ApplicationNotFound(_)) => {}
            _ => panic!("expected ApplicationNotFound"),
        }
    }

    #[test]
    fn test_get_and_delete_token() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let token = store.create_token(app.id, true).unwrap();

        let fetched = store.get_token(token.id).unwrap();
        assert_eq!(fetched, token);
        assert!(fetched.writeable);

        store.delete_token(token.id).unwrap();
        match store.get_token(token.id) {
            Err(BurrowError::TokenNotFound(id)) => assert_eq!(id, token.id),
            _ => panic!("expected TokenNotFound"),
        }
    }

    #[test]
    fn test_delete_token_not_found() {
        let store = make_store();
        assert!(store.delete_token(Uuid::new_v4()).is_err());
    }

    // --- Databases ---

    #[test]
    fn test_create_database_requires_known_application() {
        let store = make_store();
        match store.create_database(Uuid::new_v4(), "/x") {
            Err(BurrowError::ApplicationNotFound(_)) => {}
            _ => panic!("expected ApplicationNotFound"),
        }
    }

    #[test]
    fn test_create_database_rejects_relative_path() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();

        match store.create_database(app.id, "notes") {
            Err(BurrowError::InvalidPath(path)) => assert_eq!(path, "notes"),
            _ => panic!("expected InvalidPath"),
        }
    }

    #[test]
    fn test_create_database_rejects_duplicate_path() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        store.create_database(app.id, "/notes").unwrap();

        match store.create_database(app.id, "/notes") {
            Err(BurrowError::PathConflict(path)) => assert_eq!(path, "/notes"),
            _ => panic!("expected PathConflict"),
        }

        // The root `/` from application creation conflicts too.
        assert!(store.create_database(app.id, "/").is_err());
    }

    #[test]
    fn test_same_path_in_different_applications() {
        let store = make_store();
        let a = store.create_application("a").unwrap();
        let b = store.create_application("b").unwrap();

        let db_a = store.create_database(a.id, "/shared").unwrap();
        let db_b = store.create_database(b.id, "/shared").unwrap();
        assert_ne!(db_a.id, db_b.id);
    }

    #[test]
    fn test_delete_database() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/notes").unwrap();
        store.update_document(app.id, db.id, "a", b"1").unwrap();

        store.delete_database(app.id, db.id).unwrap();

        let paths: Vec<String> = store
            .list_databases(app.id, "/", true)
            .unwrap()
            .into_iter()
            .map(|db| db.path)
            .collect();
        assert_eq!(paths, vec!["/"]);

        match store.list_documents(app.id, db.id) {
            Err(BurrowError::DatabaseNotFound(id)) => assert_eq!(id, db.id),
            _ => panic!("expected DatabaseNotFound"),
        }
    }

    #[test]
    fn test_delete_database_not_found() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        assert!(store.delete_database(app.id, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_path_is_reusable_after_delete() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/notes").unwrap();
        store.delete_database(app.id, db.id).unwrap();

        let recreated = store.create_database(app.id, "/notes").unwrap();
        assert_ne!(recreated.id, db.id);
    }

    #[test]
    fn test_list_databases_prefix_filtering() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        store.create_database(app.id, "/a").unwrap();
        store.create_database(app.id, "/a/b").unwrap();
        store.create_database(app.id, "/a/b/c").unwrap();

        let paths = |dbs: Vec<Database>| -> Vec<String> {
            dbs.into_iter().map(|db| db.path).collect()
        };

        // Non-recursive keeps the prefix itself and direct children.
        let direct = store.list_databases(app.id, "/a", false).unwrap();
        assert_eq!(paths(direct), vec!["/a", "/a/b"]);

        let all = store.list_databases(app.id, "/a", true).unwrap();
        assert_eq!(paths(all), vec!["/a", "/a/b", "/a/b/c"]);

        // Root prefix: `/` plus its direct children.
        let top = store.list_databases(app.id, "/", false).unwrap();
        assert_eq!(paths(top), vec!["/", "/a"]);

        let nothing = store.list_databases(app.id, "/z", true).unwrap();
        assert!(nothing.is_empty());
    }

    // --- Documents ---

    #[test]
    fn test_update_and_read_document_roundtrip() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();

        let body = br#"{"title": "hello", "likes": 3}"#;
        store.update_document(app.id, db.id, "first post", body).unwrap();

        let read = store.read_document(app.id, db.id, "first post").unwrap();
        assert_eq!(read, body.to_vec());
    }

    #[test]
    fn test_update_document_overwrites_in_place() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();

        store.update_document(app.id, db.id, "post", b"v1").unwrap();
        store.update_document(app.id, db.id, "post", b"v2").unwrap();

        assert_eq!(store.read_document(app.id, db.id, "post").unwrap(), b"v2");
        assert_eq!(store.list_documents(app.id, db.id).unwrap().len(), 1);

        // Overwriting keeps the stable id.
        let map = store.backend.load_document_map(app.id, db.id).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_read_unknown_document() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();

        match store.read_document(app.id, db.id, "ghost") {
            Err(BurrowError::DocumentNotFound(name)) => assert_eq!(name, "ghost"),
            _ => panic!("expected DocumentNotFound"),
        }
    }

    #[test]
    fn test_read_indexed_document_with_missing_content_is_integrity_error() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();
        store.update_document(app.id, db.id, "post", b"body").unwrap();

        // Remove the content behind the store's back.
        let map = store.backend.load_document_map(app.id, db.id).unwrap();
        let id = map["post"];
        store.backend.delete_content(app.id, db.id, id).unwrap();

        match store.read_document(app.id, db.id, "post") {
            Err(BurrowError::Integrity(_)) => {}
            other => panic!("expected Integrity error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_delete_document_returns_prior_content() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();
        store.update_document(app.id, db.id, "post", b"the body").unwrap();

        let deleted = store.delete_document(app.id, db.id, "post").unwrap();
        assert_eq!(deleted, b"the body");

        assert!(store.read_document(app.id, db.id, "post").is_err());
        assert!(!store.document_exists(app.id, db.id, "post").unwrap());
    }

    #[test]
    fn test_delete_unknown_document() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();
        assert!(store.delete_document(app.id, db.id, "ghost").is_err());
    }

    #[test]
    fn test_name_is_reusable_after_delete() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();

        store.update_document(app.id, db.id, "post", b"old").unwrap();
        store.delete_document(app.id, db.id, "post").unwrap();
        store.update_document(app.id, db.id, "post", b"new").unwrap();

        assert_eq!(store.read_document(app.id, db.id, "post").unwrap(), b"new");
    }

    #[test]
    fn test_list_documents() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();

        store.update_document(app.id, db.id, "b", b"2").unwrap();
        store.update_document(app.id, db.id, "a", b"1").unwrap();

        assert_eq!(store.list_documents(app.id, db.id).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_document_exists() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();

        assert!(!store.document_exists(app.id, db.id, "post").unwrap());
        store.update_document(app.id, db.id, "post", b"x").unwrap();
        assert!(store.document_exists(app.id, db.id, "post").unwrap());
    }

    #[test]
    fn test_document_names_may_be_unsafe_for_filenames() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();

        let name = "weird/../name with spaces?*";
        store.update_document(app.id, db.id, name, b"safe").unwrap();
        assert_eq!(store.read_document(app.id, db.id, name).unwrap(), b"safe");
    }

    #[test]
    fn test_update_document_write_failure_leaves_index_unchanged() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();

        store.backend.set_simulate_write_error(true);
        assert!(store.update_document(app.id, db.id, "post", b"x").is_err());
        store.backend.set_simulate_write_error(false);

        assert!(store.list_documents(app.id, db.id).unwrap().is_empty());
    }

    // --- Lifecycle ---

    #[test]
    fn test_flush_rewrites_side_cars() {
        let store = make_store();
        let app = store.create_application("blog").unwrap();
        let db = store.create_database(app.id, "/posts").unwrap();
        store.update_document(app.id, db.id, "post", b"x").unwrap();

        store.flush().unwrap();

        let file = store.backend.load_applications().unwrap();
        assert_eq!(file.applications.len(), 1);
        let db_map = store.backend.load_db_map(app.id).unwrap();
        assert_eq!(db_map.len(), 2);
        let doc_map = store.backend.load_document_map(app.id, db.id).unwrap();
        assert!(doc_map.contains_key("post"));
    }

    #[test]
    fn test_is_direct_child() {
        assert!(is_direct_child("/a", "/a"));
        assert!(is_direct_child("/a", "/a/b"));
        assert!(!is_direct_child("/a", "/a/b/c"));
        assert!(is_direct_child("/", "/"));
        assert!(is_direct_child("/", "/a"));
        assert!(!is_direct_child("/", "/a/b"));
    }
}
