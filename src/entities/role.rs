use serde::{Deserialize, Serialize};

use super::IdentityClaim;
use crate::document::ObjectId;

/// A stored role, parameterized over its key type.
///
/// Users reference roles by name, not by key; the role document exists so
/// roles can be enumerated and can carry their own claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityRole<K = ObjectId> {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<K>,

    pub name: String,

    /// Canonicalized copy of the name, used for exact lookup.
    pub normalized_name: String,

    #[serde(default)]
    pub claims: Vec<IdentityClaim>,
}

impl<K> Default for IdentityRole<K> {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            normalized_name: String::new(),
            claims: Vec::new(),
        }
    }
}

impl<K> IdentityRole<K> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{from_document, to_document};

    #[test]
    fn document_round_trip() {
        let mut role: IdentityRole = IdentityRole::new("Admin");
        role.id = Some(ObjectId::generate());
        role.normalized_name = "ADMIN".to_string();
        role.claims.push(IdentityClaim::new("perm", "manage"));

        let doc = to_document(&role).unwrap();
        assert!(doc.contains_key("NormalizedName"));

        let back: IdentityRole = from_document(doc).unwrap();
        assert_eq!(back, role);
    }
}
