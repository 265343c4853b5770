//! Identity persistence and database migrations.
//!
//! Testsmith stores the minimal identity record created by the OAuth exchange
//! (GitHub account id, login, delegated access token) in a local `SQLite`
//! database. The schema is managed with Diesel migrations so the database can
//! be created and upgraded consistently across machines.

mod error;
mod identity_store;
mod migrator;

pub use error::PersistenceError;
pub use identity_store::{Identity, IdentityStore, IdentityWrite};
pub use migrator::{INITIAL_SCHEMA_VERSION, SchemaVersion, migrate_database};
