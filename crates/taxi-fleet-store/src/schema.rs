// SPDX-License-Identifier: Apache-2.0

use crate::StoreError;
use rusqlite::Connection;
use tracing::info;

pub const SQLITE_SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS manufacturer (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL UNIQUE,
  country TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS driver (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  username TEXT NOT NULL UNIQUE,
  password_hash TEXT NOT NULL,
  first_name TEXT NOT NULL DEFAULT '',
  last_name TEXT NOT NULL DEFAULT '',
  email TEXT NOT NULL DEFAULT '',
  is_active INTEGER NOT NULL DEFAULT 1,
  is_staff INTEGER NOT NULL DEFAULT 0,
  date_joined INTEGER NOT NULL,
  license_number TEXT NOT NULL UNIQUE CHECK (length(license_number) = 8)
);
CREATE TABLE IF NOT EXISTS car (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  model TEXT NOT NULL,
  manufacturer_id INTEGER NOT NULL REFERENCES manufacturer(id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS car_driver (
  car_id INTEGER NOT NULL REFERENCES car(id) ON DELETE CASCADE,
  driver_id INTEGER NOT NULL REFERENCES driver(id) ON DELETE CASCADE,
  PRIMARY KEY (car_id, driver_id)
) WITHOUT ROWID;
CREATE INDEX IF NOT EXISTS idx_car_manufacturer_id ON car(manufacturer_id);
CREATE INDEX IF NOT EXISTS idx_car_driver_driver_id ON car_driver(driver_id);
CREATE INDEX IF NOT EXISTS idx_car_model ON car(model);
";

pub(crate) fn apply_connection_pragmas(conn: &Connection, file_backed: bool) -> Result<(), StoreError> {
    conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA busy_timeout=2000;")?;
    if file_backed {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    }
    Ok(())
}

pub(crate) fn migrate(conn: &mut Connection) -> Result<(), StoreError> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current > SQLITE_SCHEMA_VERSION {
        return Err(StoreError::Unavailable(format!(
            "database schema version {current} is newer than supported {SQLITE_SCHEMA_VERSION}"
        )));
    }
    if current == SQLITE_SCHEMA_VERSION {
        return Ok(());
    }
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_V1)?;
    tx.execute_batch(&format!("PRAGMA user_version={SQLITE_SCHEMA_VERSION};"))?;
    tx.commit()?;
    info!(from = current, to = SQLITE_SCHEMA_VERSION, "fleet schema migrated");
    Ok(())
}
