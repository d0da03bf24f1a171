//! Entity ⇄ stored-document translation.
//!
//! Entities serialize to JSON-shaped documents whose member names follow the
//! historical collection layout (PascalCase fields, `_id` primary key). The
//! same mapping serves every key type the stores are parameterized over.

pub mod filter;
pub mod key;
pub mod object_id;

pub use filter::Filter;
pub use key::StoreKey;
pub use object_id::ObjectId;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// A stored document: a flat-keyed JSON object.
pub type Document = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to serialize entity: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("stored document does not match the expected entity shape: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("entity did not serialize to a document object")]
    NotADocument,

    #[error("invalid object id: {0:?}")]
    InvalidId(String),
}

/// Serializes an entity into its stored document form.
pub fn to_document<T: Serialize>(entity: &T) -> Result<Document, DocumentError> {
    match serde_json::to_value(entity).map_err(DocumentError::Serialize)? {
        Value::Object(map) => Ok(map),
        _ => Err(DocumentError::NotADocument),
    }
}

/// Rebuilds an entity from its stored document form.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, DocumentError> {
    serde_json::from_value(Value::Object(doc)).map_err(DocumentError::Deserialize)
}

/// Encodes a key as the value stored under `_id`.
pub fn key_value<K: Serialize>(key: &K) -> Result<Value, DocumentError> {
    serde_json::to_value(key).map_err(DocumentError::Serialize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn document_round_trip() {
        let sample = Sample {
            name: "x".to_string(),
            count: 3,
        };
        let doc = to_document(&sample).unwrap();
        assert_eq!(doc.get("name"), Some(&Value::String("x".to_string())));

        let back: Sample = from_document(doc).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn malformed_document_fails_to_decode() {
        let mut doc = Document::new();
        doc.insert("name".to_string(), Value::String("x".to_string()));
        doc.insert("count".to_string(), Value::String("not a number".to_string()));

        let err = from_document::<Sample>(doc).unwrap_err();
        assert!(matches!(err, DocumentError::Deserialize(_)));
    }

    #[test]
    fn scalar_is_not_a_document() {
        let err = to_document(&42).unwrap_err();
        assert!(matches!(err, DocumentError::NotADocument));
    }
}
