//! Role persistence over a document collection.
//!
//! Same deferred-persistence contract as the user store: name and claim
//! mutators touch the in-memory entity only, [`RoleStore::update_role`]
//! persists the whole document.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{StoreError, run_cancellable};
use crate::constants::ROLES_COLLECTION;
use crate::db::{DocumentCollection, IdentityDb};
use crate::document::{Filter, ObjectId, StoreKey, from_document, key_value, to_document};
use crate::entities::{IdentityClaim, IdentityRole};

const NORMALIZED_NAME: &str = "NormalizedName";

/// Store for [`IdentityRole`] documents in the `AspNetRoles` collection.
pub struct RoleStore<K = ObjectId> {
    roles: Arc<dyn DocumentCollection>,
    disposed: AtomicBool,
    _key: PhantomData<K>,
}

impl<K: StoreKey> RoleStore<K> {
    #[must_use]
    pub fn new(db: &IdentityDb) -> Self {
        Self {
            roles: db.collection(ROLES_COLLECTION),
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

    fn id_filter(role: &IdentityRole<K>) -> Result<Filter, StoreError> {
        let id = role
            .id
            .as_ref()
            .ok_or(StoreError::InvalidArgument("role id must be assigned"))?;
        Ok(Filter::id(key_value(id)?))
    }

    // ----- network-bound operations -----

    /// Inserts the role as a new document, assigning a generated id when
    /// none is set.
    pub async fn create_role(
        &self,
        role: &mut IdentityRole<K>,
        token: &CancellationToken,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;

        if role.id.is_none() {
            role.id = Some(K::generate().ok_or(StoreError::InvalidArgument(
                "role id must be pre-assigned for this key type",
            ))?);
        }

        let doc = to_document(role)?;
        debug!(role = %role.name, "inserting role document");
        run_cancellable(token, self.roles.insert_one(doc)).await
    }

    pub async fn find_by_id(
        &self,
        id: &K,
        token: &CancellationToken,
    ) -> Result<Option<IdentityRole<K>>, StoreError> {
        self.ensure_open()?;
        let filter = Filter::id(key_value(id)?);
        self.find_with(&filter, token).await
    }

    /// Exact match against the stored normalized role name.
    pub async fn find_by_name(
        &self,
        normalized_name: &str,
        token: &CancellationToken,
    ) -> Result<Option<IdentityRole<K>>, StoreError> {
        self.ensure_open()?;
        let filter = Filter::eq(NORMALIZED_NAME, normalized_name);
        self.find_with(&filter, token).await
    }

    /// Replaces the stored document wholesale, inserting it if missing.
    pub async fn update_role(
        &self,
        role: &IdentityRole<K>,
        token: &CancellationToken,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        let filter = Self::id_filter(role)?;
        let doc = to_document(role)?;
        debug!(role = %role.name, "replacing role document");
        run_cancellable(token, self.roles.replace_one(&filter, doc, true))
            .await
            .map(|_| ())
    }

    pub async fn delete_role(
        &self,
        role: &IdentityRole<K>,
        token: &CancellationToken,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        let filter = Self::id_filter(role)?;
        debug!(role = %role.name, "deleting role document");
        run_cancellable(token, self.roles.delete_one(&filter))
            .await
            .map(|_| ())
    }

    /// Lists every stored role.
    pub async fn roles(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<IdentityRole<K>>, StoreError> {
        self.ensure_open()?;
        let docs = run_cancellable(token, self.roles.find_all()).await?;
        docs.into_iter()
            .map(|doc| from_document(doc).map_err(Into::into))
            .collect()
    }

    async fn find_with(
        &self,
        filter: &Filter,
        token: &CancellationToken,
    ) -> Result<Option<IdentityRole<K>>, StoreError> {
        let doc = run_cancellable(token, self.roles.find_one(filter)).await?;
        doc.map(from_document).transpose().map_err(Into::into)
    }

    // ----- accessors (in-memory, persisted by update_role) -----

    pub fn role_id(&self, role: &IdentityRole<K>) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;
        Ok(role.id.as_ref().map(ToString::to_string))
    }

    pub fn role_name(&self, role: &IdentityRole<K>) -> Result<String, StoreError> {
        self.ensure_open()?;
        Ok(role.name.clone())
    }

    pub fn set_role_name(
        &self,
        role: &mut IdentityRole<K>,
        name: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        role.name = name.into();
        Ok(())
    }

    pub fn normalized_role_name(&self, role: &IdentityRole<K>) -> Result<String, StoreError> {
        self.ensure_open()?;
        Ok(role.normalized_name.clone())
    }

    pub fn set_normalized_role_name(
        &self,
        role: &mut IdentityRole<K>,
        normalized: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        role.normalized_name = normalized.into();
        Ok(())
    }

    // ----- role claims -----

    pub fn claims(&self, role: &IdentityRole<K>) -> Result<Vec<IdentityClaim>, StoreError> {
        self.ensure_open()?;
        Ok(role.claims.clone())
    }

    /// Adds a claim; an already-present (type, value) pair is left as-is.
    pub fn add_claim(
        &self,
        role: &mut IdentityRole<K>,
        claim: IdentityClaim,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        if !role.claims.contains(&claim) {
            role.claims.push(claim);
        }
        Ok(())
    }

    /// Claim removal is not part of this store's contract and fails loudly
    /// rather than silently dropping the request.
    pub fn remove_claim(
        &self,
        _role: &mut IdentityRole<K>,
        _claim: &IdentityClaim,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        Err(StoreError::Unsupported("role claim removal"))
    }
}
