// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! SQLite persistence for the fleet: manufacturers, cars, drivers and the
//! car-driver membership relation.
//!
//! Uniqueness, required references and cascades are enforced by SQLite with
//! `foreign_keys=ON`; violations surface as [`StoreError::ConstraintViolation`].

mod association;
mod cars;
mod drivers;
mod error;
mod manufacturers;
mod pagination;
mod row_decode;
mod schema;

pub use cars::CarSearch;
pub use error::{StoreError, NON_FIELD_ERRORS};
pub use pagination::{Page, PageRequest, PageSelector, PAGE_SIZE};
pub use schema::SQLITE_SCHEMA_VERSION;

use rusqlite::Connection;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

pub const CRATE_NAME: &str = "taxi-fleet-store";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetCounts {
    pub drivers: u64,
    pub manufacturers: u64,
    pub cars: u64,
}

/// One SQLite connection guarded by a mutex; callers run on the blocking pool.
pub struct FleetStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for FleetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FleetStore {
    /// Opens (creating if needed) the database file and migrates it.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("create {}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(mut conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        schema::apply_connection_pragmas(&conn, path.is_some())?;
        schema::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        f(&mut guard)
    }

    pub fn fleet_counts(&self) -> Result<FleetCounts, StoreError> {
        self.with_conn(|conn| {
            let (drivers, manufacturers, cars): (i64, i64, i64) = conn.query_row(
                "SELECT (SELECT COUNT(*) FROM driver),
                        (SELECT COUNT(*) FROM manufacturer),
                        (SELECT COUNT(*) FROM car)",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
            Ok(FleetCounts {
                drivers: u64::try_from(drivers).unwrap_or(0),
                manufacturers: u64::try_from(manufacturers).unwrap_or(0),
                cars: u64::try_from(cars).unwrap_or(0),
            })
        })
    }

    /// Cheap readiness check.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))?;
            Ok(())
        })
    }
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_is_empty_and_versioned() {
        let store = FleetStore::open_in_memory().expect("open");
        assert_eq!(
            store.fleet_counts().expect("counts"),
            FleetCounts {
                drivers: 0,
                manufacturers: 0,
                cars: 0
            }
        );
        let version: i64 = store
            .with_conn(|c| Ok(c.query_row("PRAGMA user_version", [], |r| r.get(0))?))
            .expect("version");
        assert_eq!(version, SQLITE_SCHEMA_VERSION);
        assert!(store.ping().is_ok());
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let store = FleetStore::open_in_memory().expect("open");
        let enabled: i64 = store
            .with_conn(|c| Ok(c.query_row("PRAGMA foreign_keys", [], |r| r.get(0))?))
            .expect("pragma");
        assert_eq!(enabled, 1);
    }
}
