//! Integration tests for the role store over the bundled memory backend.

use docident::db::memory::MemoryConnector;
use docident::db::IdentityDb;
use docident::entities::{IdentityClaim, IdentityRole};
use docident::stores::{RoleStore, StoreError};
use tokio_util::sync::CancellationToken;

async fn role_store() -> RoleStore {
    let connector = MemoryConnector::default();
    let db = IdentityDb::connect("mongodb://localhost:27017/identity-tests", &connector)
        .await
        .expect("memory backend should always connect");
    RoleStore::new(&db)
}

fn sample_role(store: &RoleStore) -> IdentityRole {
    let mut role = IdentityRole::new("Admin");
    store
        .set_normalized_role_name(&mut role, "ADMIN")
        .expect("store is open");
    role
}

#[tokio::test]
async fn create_then_find_round_trip() {
    let store = role_store().await;
    let token = CancellationToken::new();

    let mut role = sample_role(&store);
    store.create_role(&mut role, &token).await.unwrap();
    let id = role.id.expect("create assigns an id");

    let by_id = store.find_by_id(&id, &token).await.unwrap().unwrap();
    assert_eq!(by_id, role);

    let by_name = store.find_by_name("ADMIN", &token).await.unwrap().unwrap();
    assert_eq!(by_name, role);

    assert!(store.find_by_name("admin", &token).await.unwrap().is_none());
}

#[tokio::test]
async fn update_persists_a_rename() {
    let store = role_store().await;
    let token = CancellationToken::new();

    let mut role = sample_role(&store);
    store.create_role(&mut role, &token).await.unwrap();

    store.set_role_name(&mut role, "Operators").unwrap();
    store
        .set_normalized_role_name(&mut role, "OPERATORS")
        .unwrap();

    // deferred until update
    let stored = store
        .find_by_id(role.id.as_ref().unwrap(), &token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Admin");

    store.update_role(&role, &token).await.unwrap();

    assert!(store.find_by_name("ADMIN", &token).await.unwrap().is_none());
    let renamed = store
        .find_by_name("OPERATORS", &token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Operators");
}

#[tokio::test]
async fn delete_then_find_returns_none() {
    let store = role_store().await;
    let token = CancellationToken::new();

    let mut role = sample_role(&store);
    store.create_role(&mut role, &token).await.unwrap();
    let id = role.id.clone().unwrap();

    store.delete_role(&role, &token).await.unwrap();
    assert!(store.find_by_id(&id, &token).await.unwrap().is_none());
}

#[tokio::test]
async fn roles_lists_every_stored_role() {
    let store = role_store().await;
    let token = CancellationToken::new();

    for name in ["Admin", "Member"] {
        let mut role = IdentityRole::new(name);
        role.normalized_name = name.to_uppercase();
        store.create_role(&mut role, &token).await.unwrap();
    }

    let mut names: Vec<String> = store
        .roles(&token)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    names.sort();
    assert_eq!(names, ["Admin", "Member"]);
}

#[tokio::test]
async fn role_claims_dedup_and_removal_is_unsupported() {
    let store = role_store().await;
    let mut role = sample_role(&store);

    store
        .add_claim(&mut role, IdentityClaim::new("perm", "manage"))
        .unwrap();
    store
        .add_claim(&mut role, IdentityClaim::new("perm", "manage"))
        .unwrap();
    assert_eq!(store.claims(&role).unwrap().len(), 1);

    let err = store
        .remove_claim(&mut role, &IdentityClaim::new("perm", "manage"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Unsupported(_)));
    // and the claim is still there
    assert_eq!(store.claims(&role).unwrap().len(), 1);
}

#[tokio::test]
async fn accessors_read_and_write_names() {
    let store = role_store().await;
    let token = CancellationToken::new();

    let mut role = sample_role(&store);
    store.create_role(&mut role, &token).await.unwrap();

    assert_eq!(store.role_name(&role).unwrap(), "Admin");
    assert_eq!(store.normalized_role_name(&role).unwrap(), "ADMIN");
    assert!(store.role_id(&role).unwrap().is_some());
}

#[tokio::test]
async fn disposed_store_rejects_every_operation() {
    let store = role_store().await;
    let token = CancellationToken::new();

    let mut role = sample_role(&store);
    store.dispose();

    assert!(matches!(
        store.create_role(&mut role, &token).await,
        Err(StoreError::Disposed)
    ));
    assert!(matches!(
        store.find_by_name("ADMIN", &token).await,
        Err(StoreError::Disposed)
    ));
    assert!(matches!(
        store.add_claim(&mut role, IdentityClaim::new("perm", "manage")),
        Err(StoreError::Disposed)
    ));
    assert!(matches!(
        store.role_name(&role),
        Err(StoreError::Disposed)
    ));
}

#[tokio::test]
async fn pre_cancelled_token_fails_without_io() {
    let store = role_store().await;

    let cancelled = CancellationToken::new();
    cancelled.cancel();

    let mut role = sample_role(&store);
    assert!(matches!(
        store.create_role(&mut role, &cancelled).await,
        Err(StoreError::Cancelled)
    ));

    let live = CancellationToken::new();
    assert!(store.roles(&live).await.unwrap().is_empty());
}
