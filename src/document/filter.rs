//! Field-equality filters over stored documents.
//!
//! A filter is a conjunction of `path == value` clauses. Paths are dotted
//! member paths into the document; a segment that lands on an array matches
//! if any element matches the remainder, which is what lets a user be found
//! by `Logins.LoginProvider` / `Logins.ProviderKey` against the embedded
//! login array.

use serde_json::Value;

use super::Document;
use crate::constants::ID_FIELD;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Single equality clause.
    #[must_use]
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            clauses: vec![(path.into(), value.into())],
        }
    }

    /// Clause targeting the document primary key.
    #[must_use]
    pub fn id(value: impl Into<Value>) -> Self {
        Self::eq(ID_FIELD, value)
    }

    /// Adds another equality clause; all clauses must hold.
    #[must_use]
    pub fn and(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((path.into(), value.into()));
        self
    }

    #[must_use]
    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    /// Evaluates the filter against a document.
    ///
    /// Drivers with their own query language translate [`clauses`] instead;
    /// this evaluation is what the bundled memory backend runs.
    ///
    /// [`clauses`]: Self::clauses
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|(path, expected)| {
            let segments: Vec<&str> = path.split('.').collect();
            let Some((head, rest)) = segments.split_first() else {
                return false;
            };
            doc.get(*head)
                .is_some_and(|value| value_matches(value, rest, expected))
        })
    }
}

fn value_matches(value: &Value, segments: &[&str], expected: &Value) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        if value == expected {
            return true;
        }
        // leaf arrays match on any element
        return match value {
            Value::Array(items) => items.iter().any(|item| item == expected),
            _ => false,
        };
    };

    match value {
        Value::Object(map) => map
            .get(*head)
            .is_some_and(|inner| value_matches(inner, rest, expected)),
        Value::Array(items) => items
            .iter()
            .any(|item| value_matches(item, segments, expected)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn matches_top_level_field() {
        let d = doc(json!({"UserName": "alice", "Email": "a@x.com"}));
        assert!(Filter::eq("UserName", "alice").matches(&d));
        assert!(!Filter::eq("UserName", "bob").matches(&d));
    }

    #[test]
    fn conjunction_requires_all_clauses() {
        let d = doc(json!({"UserName": "alice", "Email": "a@x.com"}));
        assert!(
            Filter::eq("UserName", "alice")
                .and("Email", "a@x.com")
                .matches(&d)
        );
        assert!(
            !Filter::eq("UserName", "alice")
                .and("Email", "b@x.com")
                .matches(&d)
        );
    }

    #[test]
    fn dotted_path_descends_objects() {
        let d = doc(json!({"Profile": {"City": "Oslo"}}));
        assert!(Filter::eq("Profile.City", "Oslo").matches(&d));
        assert!(!Filter::eq("Profile.Country", "Oslo").matches(&d));
    }

    #[test]
    fn array_segment_matches_any_element() {
        let d = doc(json!({
            "Logins": [
                {"LoginProvider": "google", "ProviderKey": "g-1"},
                {"LoginProvider": "github", "ProviderKey": "h-2"}
            ]
        }));
        assert!(Filter::eq("Logins.LoginProvider", "github").matches(&d));
        assert!(
            Filter::eq("Logins.LoginProvider", "google")
                .and("Logins.ProviderKey", "g-1")
                .matches(&d)
        );
        assert!(!Filter::eq("Logins.LoginProvider", "twitter").matches(&d));
    }

    #[test]
    fn leaf_array_matches_contained_value() {
        let d = doc(json!({"Roles": ["Admin", "Member"]}));
        assert!(Filter::eq("Roles", "Member").matches(&d));
        assert!(!Filter::eq("Roles", "Owner").matches(&d));
    }

    #[test]
    fn missing_path_never_matches() {
        let d = doc(json!({"UserName": "alice"}));
        assert!(!Filter::eq("Missing", "x").matches(&d));
        assert!(!Filter::eq("UserName.Nested", "x").matches(&d));
    }

    #[test]
    fn id_clause_targets_primary_key_field() {
        let d = doc(json!({"_id": "507f1f77bcf86cd799439011"}));
        assert!(Filter::id("507f1f77bcf86cd799439011").matches(&d));
    }
}
