//! Document-database persistence for identity users and roles.
//!
//! `docident` binds an identity/membership framework to a schemaless
//! document store: users (with embedded claims, logins and role names) and
//! roles live in two collections, every operation is a single point
//! lookup, insert, whole-document replace or delete, and the stores are
//! parameterized over the key type used as the document id.
//!
//! The concrete driver is pluggable through the [`db`] traits; the crate
//! ships an in-memory backend for tests and embedding.
//!
//! ```no_run
//! use docident::db::{IdentityDb, memory::MemoryConnector};
//! use docident::entities::IdentityUser;
//! use docident::stores::UserStore;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = MemoryConnector::default();
//! let db = IdentityDb::connect("mongodb://localhost:27017/identity", &connector).await?;
//! let store: UserStore = UserStore::new(&db);
//!
//! let token = CancellationToken::new();
//! let mut user = IdentityUser::new("alice");
//! store.set_normalized_user_name(&mut user, "ALICE")?;
//! store.create_user(&mut user, &token).await?;
//!
//! store.add_to_role(&mut user, "Member")?;
//! store.update_user(&user, &token).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod db;
pub mod document;
pub mod entities;
pub mod stores;

pub use config::{ConfigError, ConnectionSettings};
pub use db::IdentityDb;
pub use document::{DocumentError, Filter, ObjectId, StoreKey};
pub use entities::{IdentityClaim, IdentityLogin, IdentityRole, IdentityUser};
pub use stores::{RoleStore, StoreError, UserStore};
