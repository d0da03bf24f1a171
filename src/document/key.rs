//! Key types the stores are parameterized over.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::ObjectId;

/// An equatable key usable as a document primary key.
///
/// The serde bounds define the stored encoding: [`ObjectId`] persists as its
/// hex form, `String` and `Uuid` pass through as strings, `i64` as a number.
pub trait StoreKey:
    Clone + Default + PartialEq + Send + Sync + Serialize + DeserializeOwned + fmt::Display + 'static
{
    /// Mints a new key at create time, for key types that support it.
    ///
    /// Returns `None` for key types whose values must be assigned by the
    /// caller before creation.
    fn generate() -> Option<Self>;
}

impl StoreKey for ObjectId {
    fn generate() -> Option<Self> {
        Some(ObjectId::generate())
    }
}

/// The default opaque-string key: an object id rendered as hex.
impl StoreKey for String {
    fn generate() -> Option<Self> {
        Some(ObjectId::generate().to_hex())
    }
}

impl StoreKey for Uuid {
    fn generate() -> Option<Self> {
        Some(Uuid::new_v4())
    }
}

/// Numeric keys are issued by the caller, never minted here.
impl StoreKey for i64 {
    fn generate() -> Option<Self> {
        None
    }
}
