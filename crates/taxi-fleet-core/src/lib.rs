// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use sha2::{Digest, Sha256};
use std::path::PathBuf;

pub mod secrets;

pub const CRATE_NAME: &str = "taxi-fleet-core";
pub const ENV_TAXI_DB_PATH: &str = "TAXI_DB_PATH";
pub const ENV_TAXI_DATA_DIR: &str = "TAXI_DATA_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "taxi-fleet.sqlite";

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[must_use]
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(explicit) = std::env::var(ENV_TAXI_DATA_DIR) {
        let trimmed = explicit.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME") {
        let trimmed = xdg_data_home.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed).join("taxi-fleet");
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed)
                .join(".local")
                .join("share")
                .join("taxi-fleet");
        }
    }

    PathBuf::from(".taxi-fleet")
}

/// Database file location: `TAXI_DB_PATH` wins, otherwise the data dir.
#[must_use]
pub fn resolve_database_path() -> PathBuf {
    if let Ok(explicit) = std::env::var(ENV_TAXI_DB_PATH) {
        let trimmed = explicit.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    resolve_data_dir().join(DEFAULT_DB_FILE_NAME)
}
