//! User persistence over a document collection.
//!
//! Persistence is deferred: the field and collection mutators touch only the
//! in-memory entity, and nothing reaches the database until the caller
//! invokes [`UserStore::update_user`] (or one of the other network-bound
//! operations). Updates replace the whole document keyed by id,
//! last-write-wins.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{StoreError, run_cancellable};
use crate::constants::USERS_COLLECTION;
use crate::db::{DocumentCollection, IdentityDb};
use crate::document::{Filter, ObjectId, StoreKey, from_document, key_value, to_document};
use crate::entities::{IdentityClaim, IdentityLogin, IdentityUser};

const NORMALIZED_USER_NAME: &str = "NormalizedUserName";
const EMAIL: &str = "Email";
const LOGIN_PROVIDER: &str = "Logins.LoginProvider";
const PROVIDER_KEY: &str = "Logins.ProviderKey";

/// Store for [`IdentityUser`] documents in the `AspNetUsers` collection.
pub struct UserStore<K = ObjectId> {
    users: Arc<dyn DocumentCollection>,
    disposed: AtomicBool,
    _key: PhantomData<K>,
}

impl<K: StoreKey> UserStore<K> {
    #[must_use]
    pub fn new(db: &IdentityDb) -> Self {
        Self {
            users: db.collection(USERS_COLLECTION),
            disposed: AtomicBool::new(false),
            _key: PhantomData,
        }
    }

    /// Marks the store unusable; every later operation fails with
    /// [`StoreError::Disposed`].
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_disposed() {
            return Err(StoreError::Disposed);
        }
        Ok(())
    }

    fn id_filter(user: &IdentityUser<K>) -> Result<Filter, StoreError> {
        let id = user
            .id
            .as_ref()
            .ok_or(StoreError::InvalidArgument("user id must be assigned"))?;
        Ok(Filter::id(key_value(id)?))
    }

    // ----- network-bound operations -----

    /// Inserts the user as a new document.
    ///
    /// A blank id is assigned from the key type's generator; key types
    /// without one require the caller to pre-assign the id.
    pub async fn create_user(
        &self,
        user: &mut IdentityUser<K>,
        token: &CancellationToken,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;

        if user.id.is_none() {
            user.id = Some(K::generate().ok_or(StoreError::InvalidArgument(
                "user id must be pre-assigned for this key type",
            ))?);
        }

        let doc = to_document(user)?;
        debug!(user = %user.user_name, "inserting user document");
        run_cancellable(token, self.users.insert_one(doc)).await
    }

    pub async fn find_by_id(
        &self,
        id: &K,
        token: &CancellationToken,
    ) -> Result<Option<IdentityUser<K>>, StoreError> {
        self.ensure_open()?;
        let filter = Filter::id(key_value(id)?);
        self.find_with(&filter, token).await
    }

    /// Exact match against the stored normalized user name.
    pub async fn find_by_name(
        &self,
        normalized_user_name: &str,
        token: &CancellationToken,
    ) -> Result<Option<IdentityUser<K>>, StoreError> {
        self.ensure_open()?;
        let filter = Filter::eq(NORMALIZED_USER_NAME, normalized_user_name);
        self.find_with(&filter, token).await
    }

    pub async fn find_by_email(
        &self,
        email: &str,
        token: &CancellationToken,
    ) -> Result<Option<IdentityUser<K>>, StoreError> {
        self.ensure_open()?;
        let filter = Filter::eq(EMAIL, email);
        self.find_with(&filter, token).await
    }

    /// Resolves the user owning an external login, scanning the embedded
    /// login array by (provider, key).
    pub async fn find_by_login(
        &self,
        login_provider: &str,
        provider_key: &str,
        token: &CancellationToken,
    ) -> Result<Option<IdentityUser<K>>, StoreError> {
        self.ensure_open()?;
        let filter = Filter::eq(LOGIN_PROVIDER, login_provider).and(PROVIDER_KEY, provider_key);
        self.find_with(&filter, token).await
    }

    /// Replaces the stored document wholesale, inserting it if missing.
    ///
    /// Last write wins: a concurrent writer that read the same revision is
    /// silently overwritten, including any `access_failed_count` increment it
    /// carried. There is no transactional guarantee here.
    pub async fn update_user(
        &self,
        user: &IdentityUser<K>,
        token: &CancellationToken,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        let filter = Self::id_filter(user)?;
        let doc = to_document(user)?;
        debug!(user = %user.user_name, "replacing user document");
        run_cancellable(token, self.users.replace_one(&filter, doc, true))
            .await
            .map(|_| ())
    }

    /// Removes the document keyed by the user's id.
    pub async fn delete_user(
        &self,
        user: &IdentityUser<K>,
        token: &CancellationToken,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        let filter = Self::id_filter(user)?;
        debug!(user = %user.user_name, "deleting user document");
        run_cancellable(token, self.users.delete_one(&filter))
            .await
            .map(|_| ())
    }

    /// Lists every stored user.
    pub async fn users(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<IdentityUser<K>>, StoreError> {
        self.ensure_open()?;
        let docs = run_cancellable(token, self.users.find_all()).await?;
        docs.into_iter()
            .map(|doc| from_document(doc).map_err(Into::into))
            .collect()
    }

    async fn find_with(
        &self,
        filter: &Filter,
        token: &CancellationToken,
    ) -> Result<Option<IdentityUser<K>>, StoreError> {
        let doc = run_cancellable(token, self.users.find_one(filter)).await?;
        doc.map(from_document).transpose().map_err(Into::into)
    }

    // ----- login linkage (in-memory, persisted by update_user) -----

    /// Adds an external login; an already-linked (provider, key) pair is
    /// left as-is.
    pub fn add_login(
        &self,
        user: &mut IdentityUser<K>,
        login: IdentityLogin,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        if !user
            .logins
            .iter()
            .any(|l| l.matches(&login.login_provider, &login.provider_key))
        {
            user.logins.push(login);
        }
        Ok(())
    }

    pub fn remove_login(
        &self,
        user: &mut IdentityUser<K>,
        login_provider: &str,
        provider_key: &str,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.logins
            .retain(|l| !l.matches(login_provider, provider_key));
        Ok(())
    }

    pub fn logins(&self, user: &IdentityUser<K>) -> Result<Vec<IdentityLogin>, StoreError> {
        self.ensure_open()?;
        Ok(user.logins.clone())
    }

    // ----- claims (in-memory, persisted by update_user) -----

    /// Adds claims, silently skipping (type, value) pairs already present.
    pub fn add_claims(
        &self,
        user: &mut IdentityUser<K>,
        claims: impl IntoIterator<Item = IdentityClaim>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        for claim in claims {
            if !user.claims.contains(&claim) {
                user.claims.push(claim);
            }
        }
        Ok(())
    }

    /// Removes every claim matching one of the given (type, value) pairs.
    pub fn remove_claims(
        &self,
        user: &mut IdentityUser<K>,
        claims: &[IdentityClaim],
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.claims.retain(|c| !claims.contains(c));
        Ok(())
    }

    /// Rewrites every claim matching `claim` to `new_claim`.
    pub fn replace_claim(
        &self,
        user: &mut IdentityUser<K>,
        claim: &IdentityClaim,
        new_claim: &IdentityClaim,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        for matched in user.claims.iter_mut().filter(|c| *c == claim) {
            matched.claim_type = new_claim.claim_type.clone();
            matched.claim_value = new_claim.claim_value.clone();
        }
        Ok(())
    }

    pub fn claims(&self, user: &IdentityUser<K>) -> Result<Vec<IdentityClaim>, StoreError> {
        self.ensure_open()?;
        Ok(user.claims.clone())
    }

    // ----- role membership (by name, case-insensitive) -----

    pub fn add_to_role(&self, user: &mut IdentityUser<K>, role: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        if !user.roles.iter().any(|r| r.eq_ignore_ascii_case(role)) {
            user.roles.push(role.to_string());
        }
        Ok(())
    }

    pub fn remove_from_role(
        &self,
        user: &mut IdentityUser<K>,
        role: &str,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.roles.retain(|r| !r.eq_ignore_ascii_case(role));
        Ok(())
    }

    pub fn is_in_role(&self, user: &IdentityUser<K>, role: &str) -> Result<bool, StoreError> {
        self.ensure_open()?;
        Ok(user.roles.iter().any(|r| r.eq_ignore_ascii_case(role)))
    }

    pub fn roles(&self, user: &IdentityUser<K>) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        Ok(user.roles.clone())
    }

    // ----- field accessors (in-memory, persisted by update_user) -----

    pub fn user_id(&self, user: &IdentityUser<K>) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;
        Ok(user.id.as_ref().map(ToString::to_string))
    }

    pub fn user_name(&self, user: &IdentityUser<K>) -> Result<String, StoreError> {
        self.ensure_open()?;
        Ok(user.user_name.clone())
    }

    pub fn set_user_name(
        &self,
        user: &mut IdentityUser<K>,
        user_name: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.user_name = user_name.into();
        Ok(())
    }

    pub fn normalized_user_name(&self, user: &IdentityUser<K>) -> Result<String, StoreError> {
        self.ensure_open()?;
        Ok(user.normalized_user_name.clone())
    }

    pub fn set_normalized_user_name(
        &self,
        user: &mut IdentityUser<K>,
        normalized: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.normalized_user_name = normalized.into();
        Ok(())
    }

    pub fn email(&self, user: &IdentityUser<K>) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;
        Ok(user.email.clone())
    }

    pub fn set_email(
        &self,
        user: &mut IdentityUser<K>,
        email: Option<String>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.email = email;
        Ok(())
    }

    pub fn email_confirmed(&self, user: &IdentityUser<K>) -> Result<bool, StoreError> {
        self.ensure_open()?;
        Ok(user.email_confirmed)
    }

    pub fn set_email_confirmed(
        &self,
        user: &mut IdentityUser<K>,
        confirmed: bool,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.email_confirmed = confirmed;
        Ok(())
    }

    pub fn password_hash(&self, user: &IdentityUser<K>) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;
        Ok(user.password_hash.clone())
    }

    pub fn set_password_hash(
        &self,
        user: &mut IdentityUser<K>,
        password_hash: Option<String>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.password_hash = password_hash;
        Ok(())
    }

    pub fn has_password(&self, user: &IdentityUser<K>) -> Result<bool, StoreError> {
        self.ensure_open()?;
        Ok(user.password_hash.is_some())
    }

    pub fn security_stamp(&self, user: &IdentityUser<K>) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;
        Ok(user.security_stamp.clone())
    }

    pub fn set_security_stamp(
        &self,
        user: &mut IdentityUser<K>,
        stamp: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.security_stamp = Some(stamp.into());
        Ok(())
    }

    pub fn phone_number(&self, user: &IdentityUser<K>) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;
        Ok(user.phone_number.clone())
    }

    pub fn set_phone_number(
        &self,
        user: &mut IdentityUser<K>,
        phone_number: Option<String>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.phone_number = phone_number;
        Ok(())
    }

    pub fn phone_number_confirmed(&self, user: &IdentityUser<K>) -> Result<bool, StoreError> {
        self.ensure_open()?;
        Ok(user.phone_number_confirmed)
    }

    pub fn set_phone_number_confirmed(
        &self,
        user: &mut IdentityUser<K>,
        confirmed: bool,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.phone_number_confirmed = confirmed;
        Ok(())
    }

    pub fn two_factor_enabled(&self, user: &IdentityUser<K>) -> Result<bool, StoreError> {
        self.ensure_open()?;
        Ok(user.two_factor_enabled)
    }

    pub fn set_two_factor_enabled(
        &self,
        user: &mut IdentityUser<K>,
        enabled: bool,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.two_factor_enabled = enabled;
        Ok(())
    }

    // ----- lockout -----

    /// End of the user's lockout; anything in the past means not locked out.
    pub fn lockout_end(
        &self,
        user: &IdentityUser<K>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.ensure_open()?;
        Ok(user.lockout_end_utc)
    }

    /// Locks the user out until the given instant; a past instant unlocks.
    pub fn set_lockout_end(
        &self,
        user: &mut IdentityUser<K>,
        lockout_end: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.lockout_end_utc = lockout_end;
        Ok(())
    }

    pub fn lockout_enabled(&self, user: &IdentityUser<K>) -> Result<bool, StoreError> {
        self.ensure_open()?;
        Ok(user.lockout_enabled)
    }

    pub fn set_lockout_enabled(
        &self,
        user: &mut IdentityUser<K>,
        enabled: bool,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.lockout_enabled = enabled;
        Ok(())
    }

    pub fn access_failed_count(&self, user: &IdentityUser<K>) -> Result<u32, StoreError> {
        self.ensure_open()?;
        Ok(user.access_failed_count)
    }

    /// Records a failed access attempt and returns the new count.
    pub fn increment_access_failed_count(
        &self,
        user: &mut IdentityUser<K>,
    ) -> Result<u32, StoreError> {
        self.ensure_open()?;
        user.access_failed_count += 1;
        Ok(user.access_failed_count)
    }

    pub fn reset_access_failed_count(
        &self,
        user: &mut IdentityUser<K>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        user.access_failed_count = 0;
        Ok(())
    }
}
