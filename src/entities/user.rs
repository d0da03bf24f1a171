use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{IdentityClaim, IdentityLogin};
use crate::document::ObjectId;

/// A stored user account, parameterized over its key type.
///
/// Plain data: the stores mutate instances in place and persist them as
/// whole documents. Roles are held by name (case-insensitive membership),
/// claims and logins are embedded sub-documents; all three default to empty
/// and are never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityUser<K = ObjectId> {
    /// Assigned at creation and never changed afterwards; the sole identity
    /// used for update/delete targeting.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<K>,

    pub user_name: String,

    /// Canonicalized copy of the user name, used for exact lookup.
    pub normalized_user_name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub email_confirmed: bool,

    #[serde(default)]
    pub password_hash: Option<String>,

    /// Opaque token regenerated whenever credentials change.
    #[serde(default)]
    pub security_stamp: Option<String>,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub phone_number_confirmed: bool,

    #[serde(default)]
    pub two_factor_enabled: bool,

    #[serde(default)]
    pub lockout_enabled: bool,

    /// Absent or past means not locked out.
    #[serde(default)]
    pub lockout_end_utc: Option<DateTime<Utc>>,

    #[serde(default)]
    pub access_failed_count: u32,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub claims: Vec<IdentityClaim>,

    #[serde(default)]
    pub logins: Vec<IdentityLogin>,
}

impl<K> Default for IdentityUser<K> {
    fn default() -> Self {
        Self {
            id: None,
            user_name: String::new(),
            normalized_user_name: String::new(),
            email: None,
            email_confirmed: false,
            password_hash: None,
            security_stamp: None,
            phone_number: None,
            phone_number_confirmed: false,
            two_factor_enabled: false,
            lockout_enabled: false,
            lockout_end_utc: None,
            access_failed_count: 0,
            roles: Vec::new(),
            claims: Vec::new(),
            logins: Vec::new(),
        }
    }
}

impl<K> IdentityUser<K> {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            ..Self::default()
        }
    }

    /// Mints a fresh security stamp and returns it.
    pub fn regenerate_security_stamp(&mut self) -> &str {
        self.security_stamp
            .insert(Uuid::new_v4().to_string())
            .as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{from_document, to_document};

    #[test]
    fn document_round_trip_preserves_every_field() {
        let mut user: IdentityUser = IdentityUser::new("alice");
        user.id = Some(ObjectId::generate());
        user.normalized_user_name = "ALICE".to_string();
        user.email = Some("a@x.com".to_string());
        user.email_confirmed = true;
        user.password_hash = Some("hash".to_string());
        user.security_stamp = Some("stamp".to_string());
        user.phone_number = Some("555".to_string());
        user.two_factor_enabled = true;
        user.lockout_enabled = true;
        user.lockout_end_utc = Some(Utc::now());
        user.access_failed_count = 2;
        user.roles.push("Member".to_string());
        user.claims.push(IdentityClaim::new("scope", "read"));
        user.logins.push(IdentityLogin::new("google", "g-1"));

        let doc = to_document(&user).unwrap();
        let back: IdentityUser = from_document(doc).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn empty_collections_round_trip_as_present_and_empty() {
        let mut user: IdentityUser = IdentityUser::new("bob");
        user.id = Some(ObjectId::generate());
        user.normalized_user_name = "BOB".to_string();

        let doc = to_document(&user).unwrap();
        assert_eq!(doc.get("Roles"), Some(&serde_json::json!([])));
        assert_eq!(doc.get("Claims"), Some(&serde_json::json!([])));
        assert_eq!(doc.get("Logins"), Some(&serde_json::json!([])));

        let back: IdentityUser = from_document(doc).unwrap();
        assert_eq!(back, user);
        assert!(back.roles.is_empty());
        assert!(back.claims.is_empty());
        assert!(back.logins.is_empty());
    }

    #[test]
    fn blank_id_is_omitted_from_the_document() {
        let user: IdentityUser = IdentityUser::new("carol");
        let doc = to_document(&user).unwrap();
        assert!(!doc.contains_key("_id"));
    }

    #[test]
    fn persisted_member_names_follow_the_collection_layout() {
        let mut user: IdentityUser = IdentityUser::new("dave");
        user.normalized_user_name = "DAVE".to_string();
        let doc = to_document(&user).unwrap();
        assert!(doc.contains_key("UserName"));
        assert!(doc.contains_key("NormalizedUserName"));
        assert!(doc.contains_key("AccessFailedCount"));
        assert!(doc.contains_key("TwoFactorEnabled"));
    }

    #[test]
    fn document_without_required_fields_fails_to_decode() {
        let mut doc = crate::document::Document::new();
        doc.insert("_id".to_string(), serde_json::json!("507f1f77bcf86cd799439011"));
        // no UserName / NormalizedUserName
        assert!(from_document::<IdentityUser>(doc).is_err());
    }

    #[test]
    fn regenerated_stamps_differ() {
        let mut user: IdentityUser = IdentityUser::new("erin");
        let first = user.regenerate_security_stamp().to_string();
        let second = user.regenerate_security_stamp().to_string();
        assert_ne!(first, second);
    }
}
