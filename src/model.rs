use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tenant. Owns at least one database (the root database at `/`) and is
/// referenced by tokens. Names are display labels and are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub name: String,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A bearer credential scoped to one application. The id doubles as the
/// secret. `writeable` distinguishes read-only tokens from writing ones;
/// enforcement happens at the boundary layer, the store only carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: Uuid,
    pub application: Uuid,
    pub writeable: bool,
}

impl Token {
    pub fn new(application: Uuid, writeable: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            application,
            writeable,
        }
    }
}

/// A path-identified container for documents, scoped to one application.
///
/// Paths begin with `/` and form a virtual hierarchy through prefix
/// matching, but each database is stored as a flat unique string, not a
/// tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub id: Uuid,
    pub application: Uuid,
    pub path: String,
}

impl Database {
    pub fn new(application: Uuid, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            application,
            path: path.into(),
        }
    }
}

/// On-disk schema of the store-wide `applications.json` side-car.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationsFile {
    pub applications: Vec<Application>,
    pub tokens: Vec<Token>,
}
