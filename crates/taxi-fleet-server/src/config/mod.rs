// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use std::time::Duration;
use taxi_fleet_model::{DriverRegistration, NewDriver, ValidationErrors};

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    pub store_timeout: Duration,
    pub session_ttl: Duration,
    pub anonymous_session_ttl: Duration,
    pub session_purge_interval: Duration,
    pub shutdown_drain: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024,
            store_timeout: Duration::from_millis(2000),
            session_ttl: Duration::from_secs(14 * 24 * 3600),
            anonymous_session_ttl: Duration::from_secs(30 * 60),
            session_purge_interval: Duration::from_secs(300),
            shutdown_drain: Duration::from_millis(2000),
        }
    }
}

/// Staff account created at startup when the admin variables are set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
    pub license_number: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("license_number", &self.license_number)
            .finish_non_exhaustive()
    }
}

impl AdminBootstrap {
    /// Runs the account through the same rules as driver registration.
    pub fn to_new_driver(&self) -> Result<NewDriver, ValidationErrors> {
        DriverRegistration {
            username: self.username.clone(),
            password1: self.password.clone(),
            password2: self.password.clone(),
            license_number: self.license_number.clone(),
            ..DriverRegistration::default()
        }
        .validate()
        .map(|driver| driver.with_staff(true))
    }
}

pub fn validate_startup_config_contract(
    api: &ApiConfig,
    admin: Option<&AdminBootstrap>,
) -> Result<(), String> {
    if api.max_body_bytes == 0 {
        return Err("max body bytes must be > 0".to_string());
    }
    if api.store_timeout.is_zero() {
        return Err("store timeout must be > 0".to_string());
    }
    if api.session_ttl.is_zero() || api.session_purge_interval.is_zero() {
        return Err("session ttl and purge interval must be > 0".to_string());
    }
    if api.anonymous_session_ttl.is_zero() || api.anonymous_session_ttl > api.session_ttl {
        return Err("anonymous session ttl must be > 0 and <= session ttl".to_string());
    }
    if let Some(admin) = admin {
        admin
            .to_new_driver()
            .map_err(|e| format!("invalid admin bootstrap account: {e}"))?;
    }
    Ok(())
}
