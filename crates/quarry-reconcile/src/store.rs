//! The coordination store: resolution key -> highest version marker seen.
//!
//! Backed by libSQL, either a local file (shared between workers on one
//! host), `:memory:` for tests, or a remote `libsql://` database shared
//! between hosts.

use libsql::Builder;

use crate::error::ReconcileError;
use crate::key::{ResolutionKey, VersionMarker};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS markers (
    key TEXT PRIMARY KEY,
    marker TEXT NOT NULL
)";

/// Store `marker` unless a greater one is already stored, and return the
/// stored value. One statement, so concurrent writers cannot interleave
/// between the read and the write.
const UPDATE_MAX: &str = "INSERT INTO markers (key, marker) VALUES (?1, ?2)
    ON CONFLICT(key) DO UPDATE SET marker = CASE
        WHEN excluded.marker > markers.marker THEN excluded.marker
        ELSE markers.marker
    END
    RETURNING marker";

pub struct CoordinationStore {
    /// Keeps the database open for `conn`.
    _db: libsql::Database,
    conn: libsql::Connection,
}

impl CoordinationStore {
    /// Open the store at `url`.
    ///
    /// `libsql://`, `http://` and `https://` URLs open a remote database with
    /// `auth_token`; anything else is a local path or `:memory:`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] if the database cannot be opened or the
    /// marker table cannot be created.
    pub async fn open(url: &str, auth_token: &str) -> Result<Self, ReconcileError> {
        if is_remote(url) {
            Self::open_remote(url, auth_token).await
        } else {
            Self::open_local(url).await
        }
    }

    /// Open a local database file (or `:memory:`).
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] if the database cannot be opened or the
    /// marker table cannot be created.
    pub async fn open_local(path: &str) -> Result<Self, ReconcileError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        let store = Self { _db: db, conn };
        store.migrate().await?;
        tracing::debug!(path, "opened local coordination store");
        Ok(store)
    }

    /// Open a remote database.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] if the database cannot be reached or the
    /// marker table cannot be created.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, ReconcileError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        let conn = db.connect()?;
        let store = Self { _db: db, conn };
        store.migrate().await?;
        tracing::debug!(url, "opened remote coordination store");
        Ok(store)
    }

    /// A private in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] if libSQL cannot create the database.
    pub async fn in_memory() -> Result<Self, ReconcileError> {
        Self::open_local(":memory:").await
    }

    async fn migrate(&self) -> Result<(), ReconcileError> {
        self.conn
            .execute(SCHEMA, ())
            .await
            .map_err(|e| ReconcileError::Migration(format!("markers: {e}")))?;
        Ok(())
    }

    /// The marker stored for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::LibSql`] if the query fails.
    pub async fn get(&self, key: &ResolutionKey) -> Result<Option<VersionMarker>, ReconcileError> {
        let mut rows = self
            .conn
            .query("SELECT marker FROM markers WHERE key = ?1", libsql::params![key.as_str()])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(VersionMarker::new(row.get::<String>(0)?))),
            None => Ok(None),
        }
    }

    /// Unconditionally store `marker` for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::LibSql`] if the statement fails.
    pub async fn set(&self, key: &ResolutionKey, marker: &VersionMarker) -> Result<(), ReconcileError> {
        self.conn
            .execute(
                "INSERT INTO markers (key, marker) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET marker = excluded.marker",
                libsql::params![key.as_str(), marker.as_str()],
            )
            .await?;
        Ok(())
    }

    /// Atomically raise the stored marker to `max(stored, marker)` and
    /// return the result.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] if the statement fails or returns no row.
    pub async fn update_max(
        &self,
        key: &ResolutionKey,
        marker: &VersionMarker,
    ) -> Result<VersionMarker, ReconcileError> {
        let mut rows = self
            .conn
            .query(UPDATE_MAX, libsql::params![key.as_str(), marker.as_str()])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| ReconcileError::NoResult(key.to_string()))?;
        Ok(VersionMarker::new(row.get::<String>(0)?))
    }
}

fn is_remote(url: &str) -> bool {
    ["libsql://", "http://", "https://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}
