//! The driver seam and the database context built on top of it.
//!
//! The stores never talk to a network client directly; they issue every
//! request through [`DocumentCollection`], and a [`Connector`] turns resolved
//! connection settings into a [`DocumentDatabase`] handle exactly once, when
//! the owning context is constructed. The bundled [`memory`] backend
//! implements the same seam for tests and embedding.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::config::{ConfigError, ConnectionSettings};
use crate::document::{Document, Filter};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("a document with this id already exists")]
    DuplicateId,

    #[error("backend error: {0}")]
    Backend(String),
}

/// One named collection of documents.
///
/// Every operation is a single request that fully succeeds or fully fails;
/// filters are conjunctions of field-equality predicates.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    async fn insert_one(&self, doc: Document) -> Result<(), DbError>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, DbError>;

    async fn find_all(&self) -> Result<Vec<Document>, DbError>;

    /// Replaces the first matching document wholesale. With `upsert`, a
    /// missing match inserts the document instead. Returns whether anything
    /// was written.
    async fn replace_one(
        &self,
        filter: &Filter,
        doc: Document,
        upsert: bool,
    ) -> Result<bool, DbError>;

    /// Removes the first matching document. Returns whether one was removed.
    async fn delete_one(&self, filter: &Filter) -> Result<bool, DbError>;
}

/// A handle bound to one database, safe for concurrent use.
pub trait DocumentDatabase: Send + Sync {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection>;
}

/// Opens a database handle from resolved connection settings.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(
        &self,
        url: &Url,
        database: &str,
    ) -> Result<Arc<dyn DocumentDatabase>, ConfigError>;
}

/// The database context the stores are constructed from.
///
/// Holds the one shared handle for its lifetime; cloning shares the handle
/// rather than reconnecting.
#[derive(Clone)]
pub struct IdentityDb {
    database: Arc<dyn DocumentDatabase>,
    name: String,
}

impl IdentityDb {
    /// Resolves `settings` (URL or symbolic name) and opens the handle once.
    pub async fn connect(settings: &str, connector: &dyn Connector) -> Result<Self, ConfigError> {
        let resolved = ConnectionSettings::resolve(settings)?;
        let database = connector.open(&resolved.url, &resolved.database).await?;

        info!(database = %resolved.database, "document database connected");

        Ok(Self {
            database,
            name: resolved.database,
        })
    }

    /// Wraps an already-open handle, for embedding and tests.
    pub fn from_database(database: Arc<dyn DocumentDatabase>, name: impl Into<String>) -> Self {
        Self {
            database,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        self.database.collection(name)
    }

    #[must_use]
    pub fn database_name(&self) -> &str {
        &self.name
    }
}
