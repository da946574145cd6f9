use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;
use std::sync::Arc;
use tracing::info;

use super::collection::{DatabaseError, DocumentCollection};
use super::memory::MemoryCollection;
use super::mongo::MongoCollection;
use crate::config::DatabaseConfig;

pub const USERS: &str = "users";
pub const COURSES: &str = "courses";
pub const NOTES: &str = "notes";
pub const CLASSROOMS: &str = "classrooms";

/// The four collection handles the gateway serves, bound once at startup
#[derive(Clone)]
pub struct Collections {
    pub users: Arc<dyn DocumentCollection>,
    pub courses: Arc<dyn DocumentCollection>,
    pub notes: Arc<dyn DocumentCollection>,
    pub classrooms: Arc<dyn DocumentCollection>,
}

impl Collections {
    /// Connect to MongoDB, verify the server answers, and create the unique
    /// indexes before handing out any collection.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(config.app_name.clone());

        let client = Client::with_options(options)?;
        let database = client.database(&config.name);
        database.run_command(doc! { "ping": 1 }, None).await?;

        info!(
            "Connected to MongoDB at {} (database: {})",
            redact_uri(&config.uri).unwrap_or_else(|_| "<unparsed uri>".to_string()),
            config.name
        );

        let bind = |name: &str| -> Arc<dyn DocumentCollection> {
            Arc::new(MongoCollection::new(database.collection(name)))
        };
        let collections = Self {
            users: bind(USERS),
            courses: bind(COURSES),
            notes: bind(NOTES),
            classrooms: bind(CLASSROOMS),
        };

        collections.ensure_indexes().await?;
        Ok(collections)
    }

    /// Process-local collections, used by tests and embedders
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        let bind = |name: &str| -> Arc<dyn DocumentCollection> { Arc::new(MemoryCollection::new(name)) };
        let collections = Self {
            users: bind(USERS),
            courses: bind(COURSES),
            notes: bind(NOTES),
            classrooms: bind(CLASSROOMS),
        };

        collections.ensure_indexes().await?;
        Ok(collections)
    }

    async fn ensure_indexes(&self) -> Result<(), DatabaseError> {
        self.classrooms.ensure_unique("classCode").await?;
        self.users.ensure_unique("uid").await?;
        Ok(())
    }
}

/// Connection string with any password removed, safe for logs
pub fn redact_uri(uri: &str) -> Result<String, DatabaseError> {
    let mut url = url::Url::parse(uri).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    if url.password().is_some() {
        url.set_password(Some("****"))
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    }
    Ok(url.into())
}
