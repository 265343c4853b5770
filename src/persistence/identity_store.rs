//! Identity record store backed by `SQLite`.
//!
//! The OAuth exchange upserts one row per GitHub account; the credential
//! verifier loads rows by internal id on every authenticated request. The
//! delegated access token column always holds the most recently issued token
//! and is overwritten on re-login, never appended.

use diesel::Connection;
use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};
use diesel::sqlite::SqliteConnection;

use super::PersistenceError;

const IDENTITIES_TABLE: &str = "identities";

/// A persisted identity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Internal identifier embedded in session credentials.
    pub id: i64,
    /// GitHub account id, unique per identity.
    pub github_id: String,
    /// GitHub login name, refreshed on every login.
    pub login: String,
    /// Delegated access token issued by the OAuth provider.
    pub access_token: String,
    /// Creation timestamp recorded by `SQLite`.
    pub created_at: String,
    /// Last-update timestamp recorded by `SQLite`.
    pub updated_at: String,
}

/// Data required to create or refresh an identity row.
#[derive(Debug, Clone, Copy)]
pub struct IdentityWrite<'a> {
    /// GitHub account id.
    pub github_id: &'a str,
    /// GitHub login name.
    pub login: &'a str,
    /// Delegated access token from the OAuth provider.
    pub access_token: &'a str,
}

/// SQLite-backed store for identity records.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    database_url: String,
}

#[derive(Debug, QueryableByName)]
struct IdentityRow {
    #[diesel(sql_type = BigInt)]
    id: i64,
    #[diesel(sql_type = Text)]
    github_id: String,
    #[diesel(sql_type = Text)]
    login: String,
    #[diesel(sql_type = Text)]
    access_token: String,
    #[diesel(sql_type = Text)]
    created_at: String,
    #[diesel(sql_type = Text)]
    updated_at: String,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Self {
            id: row.id,
            github_id: row.github_id,
            login: row.login,
            access_token: row.access_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, github_id, login, access_token, created_at, updated_at";

impl IdentityStore {
    /// Create a store wrapper targeting the configured `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] when the URL is blank.
    pub fn new(database_url: impl Into<String>) -> Result<Self, PersistenceError> {
        let database_url_string = database_url.into();
        if database_url_string.trim().is_empty() {
            return Err(PersistenceError::BlankDatabaseUrl);
        }
        Ok(Self {
            database_url: database_url_string,
        })
    }

    /// Creates an identity for the GitHub account or refreshes its login and
    /// delegated access token, then returns the stored row.
    ///
    /// Concurrent logins for the same account race only on the final token
    /// overwrite; the last writer wins.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened, the
    /// schema is missing, or the write fails.
    pub fn upsert(&self, write: IdentityWrite<'_>) -> Result<Identity, PersistenceError> {
        let mut connection = self.establish_connection()?;

        sql_query(
            "INSERT INTO identities (github_id, login, access_token) \
             VALUES (?, ?, ?) \
             ON CONFLICT(github_id) DO UPDATE SET \
               login = excluded.login, \
               access_token = excluded.access_token, \
               updated_at = CURRENT_TIMESTAMP;",
        )
        .bind::<Text, _>(write.github_id)
        .bind::<Text, _>(write.login)
        .bind::<Text, _>(write.access_token)
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| Self::map_write_error(&mut connection, &error))?;

        let row: Option<IdentityRow> = sql_query(format!(
            "SELECT {SELECT_COLUMNS} FROM identities WHERE github_id = ? LIMIT 1;"
        ))
        .bind::<Text, _>(write.github_id)
        .get_result(&mut connection)
        .optional()
        .map_err(|error| Self::map_query_error(&mut connection, &error))?;

        row.map(Identity::from)
            .ok_or_else(|| PersistenceError::WriteFailed {
                message: "upserted identity row could not be read back".to_owned(),
            })
    }

    /// Fetches an identity by its internal id.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened, the
    /// schema is missing, or the query fails.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Identity>, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let row: Option<IdentityRow> = sql_query(format!(
            "SELECT {SELECT_COLUMNS} FROM identities WHERE id = ? LIMIT 1;"
        ))
        .bind::<BigInt, _>(id)
        .get_result(&mut connection)
        .optional()
        .map_err(|error| Self::map_query_error(&mut connection, &error))?;

        Ok(row.map(Identity::from))
    }

    /// Fetches an identity by its GitHub account id.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened, the
    /// schema is missing, or the query fails.
    pub fn find_by_github_id(
        &self,
        github_id: &str,
    ) -> Result<Option<Identity>, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let row: Option<IdentityRow> = sql_query(format!(
            "SELECT {SELECT_COLUMNS} FROM identities WHERE github_id = ? LIMIT 1;"
        ))
        .bind::<Text, _>(github_id)
        .get_result(&mut connection)
        .optional()
        .map_err(|error| Self::map_query_error(&mut connection, &error))?;

        Ok(row.map(Identity::from))
    }

    fn establish_connection(&self) -> Result<SqliteConnection, PersistenceError> {
        let mut connection = SqliteConnection::establish(&self.database_url).map_err(|error| {
            PersistenceError::ConnectionFailed {
                message: error.to_string(),
            }
        })?;

        sql_query("PRAGMA foreign_keys = ON;")
            .execute(&mut connection)
            .map(drop)
            .map_err(|error| PersistenceError::ForeignKeysEnableFailed {
                message: error.to_string(),
            })?;

        Ok(connection)
    }

    fn identities_table_exists(
        connection: &mut SqliteConnection,
    ) -> Result<bool, diesel::result::Error> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            one: i64,
        }

        let exists: Option<Row> = sql_query(
            "SELECT 1 AS one FROM sqlite_master WHERE type = 'table' AND name = ? LIMIT 1;",
        )
        .bind::<Text, _>(IDENTITIES_TABLE)
        .get_result(connection)
        .optional()?;

        let _ = exists.as_ref().map(|row| row.one);
        Ok(exists.is_some())
    }

    fn map_error_with_schema_check<F>(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
        create_error: F,
    ) -> PersistenceError
    where
        F: Fn(String) -> PersistenceError,
    {
        match Self::identities_table_exists(connection) {
            Ok(false) => PersistenceError::SchemaNotInitialised,
            Ok(true) => create_error(error.to_string()),
            Err(check_error) => create_error(format!(
                "schema presence check failed: {check_error}; original error: {error}"
            )),
        }
    }

    fn map_query_error(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
    ) -> PersistenceError {
        Self::map_error_with_schema_check(connection, error, |message| {
            PersistenceError::QueryFailed { message }
        })
    }

    fn map_write_error(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
    ) -> PersistenceError {
        Self::map_error_with_schema_check(connection, error, |message| {
            PersistenceError::WriteFailed { message }
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::{IdentityStore, IdentityWrite};
    use crate::persistence::{PersistenceError, migrate_database};
    use crate::telemetry::NoopTelemetrySink;

    struct StoreFixture {
        store: IdentityStore,
        _workdir: TempDir,
    }

    #[fixture]
    fn migrated_store() -> StoreFixture {
        let workdir = TempDir::new().expect("temp dir should be created");
        let database_path = workdir.path().join("identities.sqlite");
        let database_url = database_path.to_string_lossy().into_owned();

        migrate_database(&database_url, &NoopTelemetrySink).expect("migrations should run");

        StoreFixture {
            store: IdentityStore::new(database_url).expect("store should build"),
            _workdir: workdir,
        }
    }

    #[rstest]
    fn upsert_creates_then_overwrites_token(migrated_store: StoreFixture) {
        let store = &migrated_store.store;

        let created = store
            .upsert(IdentityWrite {
                github_id: "42",
                login: "octocat",
                access_token: "gho_first",
            })
            .expect("first upsert should succeed");

        assert_eq!(created.github_id, "42");
        assert_eq!(created.login, "octocat");
        assert_eq!(created.access_token, "gho_first");

        let refreshed = store
            .upsert(IdentityWrite {
                github_id: "42",
                login: "octocat-renamed",
                access_token: "gho_second",
            })
            .expect("second upsert should succeed");

        assert_eq!(
            refreshed.id, created.id,
            "re-login must not allocate a new identity"
        );
        assert_eq!(refreshed.login, "octocat-renamed");
        assert_eq!(refreshed.access_token, "gho_second");
    }

    #[rstest]
    fn find_by_id_round_trips(migrated_store: StoreFixture) {
        let store = &migrated_store.store;

        let created = store
            .upsert(IdentityWrite {
                github_id: "7",
                login: "hubber",
                access_token: "gho_token",
            })
            .expect("upsert should succeed");

        let loaded = store
            .find_by_id(created.id)
            .expect("lookup should succeed")
            .expect("identity should exist");

        assert_eq!(loaded, created);
        assert!(
            store
                .find_by_id(created.id + 999)
                .expect("lookup should succeed")
                .is_none()
        );
    }

    #[rstest]
    fn distinct_accounts_get_distinct_ids(migrated_store: StoreFixture) {
        let store = &migrated_store.store;

        let first = store
            .upsert(IdentityWrite {
                github_id: "1",
                login: "a",
                access_token: "t1",
            })
            .expect("upsert should succeed");
        let second = store
            .upsert(IdentityWrite {
                github_id: "2",
                login: "b",
                access_token: "t2",
            })
            .expect("upsert should succeed");

        assert_ne!(first.id, second.id);
        assert_eq!(
            store
                .find_by_github_id("2")
                .expect("lookup should succeed")
                .map(|identity| identity.id),
            Some(second.id)
        );
    }

    #[test]
    fn queries_before_migration_report_missing_schema() {
        let workdir = TempDir::new().expect("temp dir should be created");
        let database_path = workdir.path().join("fresh.sqlite");
        let store = IdentityStore::new(database_path.to_string_lossy().into_owned())
            .expect("store should build");

        let error = store
            .find_by_id(1)
            .expect_err("query against an unmigrated database should fail");

        assert_eq!(error, PersistenceError::SchemaNotInitialised);
    }

    #[test]
    fn blank_database_url_is_rejected() {
        let error = IdentityStore::new("   ").expect_err("blank URL should fail");
        assert_eq!(error, PersistenceError::BlankDatabaseUrl);
    }
}
