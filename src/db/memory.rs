//! In-memory backend implementing the driver seam.
//!
//! Backs the test suite and embedded use. Collections are plain vectors
//! behind an async lock; the connector keeps one database per name, so
//! reconnecting to the same name sees the same data for the process
//! lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use super::{Connector, DbError, DocumentCollection, DocumentDatabase};
use crate::config::ConfigError;
use crate::constants::ID_FIELD;
use crate::document::{Document, Filter};

#[derive(Default)]
pub struct MemoryCollection {
    docs: RwLock<Vec<Document>>,
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn insert_one(&self, doc: Document) -> Result<(), DbError> {
        let mut docs = self.docs.write().await;

        if let Some(id) = doc.get(ID_FIELD)
            && docs.iter().any(|existing| existing.get(ID_FIELD) == Some(id))
        {
            return Err(DbError::DuplicateId);
        }

        docs.push(doc);
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, DbError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|doc| filter.matches(doc)).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Document>, DbError> {
        let docs = self.docs.read().await;
        Ok(docs.clone())
    }

    async fn replace_one(
        &self,
        filter: &Filter,
        doc: Document,
        upsert: bool,
    ) -> Result<bool, DbError> {
        let mut docs = self.docs.write().await;

        if let Some(position) = docs.iter().position(|existing| filter.matches(existing)) {
            docs[position] = doc;
            return Ok(true);
        }

        if upsert {
            docs.push(doc);
            return Ok(true);
        }

        Ok(false)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<bool, DbError> {
        let mut docs = self.docs.write().await;

        if let Some(position) = docs.iter().position(|existing| filter.matches(existing)) {
            docs.remove(position);
            return Ok(true);
        }

        Ok(false)
    }
}

#[derive(Default)]
pub struct MemoryDatabase {
    collections: Mutex<HashMap<String, Arc<MemoryCollection>>>,
}

impl DocumentDatabase for MemoryDatabase {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        let mut collections = self.collections.lock().expect("collection registry poisoned");
        let collection = collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCollection::default()));
        Arc::clone(collection) as Arc<dyn DocumentCollection>
    }
}

/// Connector handing out in-memory databases keyed by name.
#[derive(Default)]
pub struct MemoryConnector {
    databases: Mutex<HashMap<String, Arc<MemoryDatabase>>>,
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(
        &self,
        _url: &Url,
        database: &str,
    ) -> Result<Arc<dyn DocumentDatabase>, ConfigError> {
        let mut databases = self.databases.lock().expect("database registry poisoned");
        let db = databases
            .entry(database.to_string())
            .or_insert_with(|| Arc::new(MemoryDatabase::default()));
        Ok(Arc::clone(db) as Arc<dyn DocumentDatabase>)
    }
}
