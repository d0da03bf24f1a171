use serde::{Deserialize, Serialize};

/// A (type, value) claim attached to a user or role.
///
/// The pair is what identifies a claim: two claims with the same type and
/// value are the same claim, and adds of an already-present pair are
/// suppressed by the stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityClaim {
    pub claim_type: String,

    pub claim_value: String,
}

impl IdentityClaim {
    pub fn new(claim_type: impl Into<String>, claim_value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
        }
    }

    #[must_use]
    pub fn matches(&self, claim_type: &str, claim_value: &str) -> bool {
        self.claim_type == claim_type && self.claim_value == claim_value
    }
}
