use serde::{Deserialize, Serialize};

/// Linkage to an external login provider.
///
/// The (provider, key) pair resolves a user from an external sign-in and is
/// expected to map to at most one user at a time; the stores dedup on the
/// pair but do not enforce global uniqueness atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityLogin {
    pub login_provider: String,

    pub provider_key: String,
}

impl IdentityLogin {
    pub fn new(login_provider: impl Into<String>, provider_key: impl Into<String>) -> Self {
        Self {
            login_provider: login_provider.into(),
            provider_key: provider_key.into(),
        }
    }

    #[must_use]
    pub fn matches(&self, login_provider: &str, provider_key: &str) -> bool {
        self.login_provider == login_provider && self.provider_key == provider_key
    }
}
