// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};
use taxi_fleet_api::ApiError;
use taxi_fleet_core::secrets::random_token;
use taxi_fleet_model::DriverId;
use tokio::sync::Mutex;

pub const SESSION_COOKIE: &str = "taxi_session";

/// Per-browser state: the logged-in driver, if any, and the home-page visit counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    pub driver_id: Option<DriverId>,
    pub num_visits: u64,
}

#[derive(Debug)]
struct SessionEntry {
    data: SessionData,
    last_seen: Instant,
}

impl SessionEntry {
    fn expired(&self, store: &SessionStore) -> bool {
        self.last_seen.elapsed() > store.ttl_for(&self.data)
    }
}

/// In-process session map with sliding expiry. Sessions without a logged-in
/// driver only carry the visit counter and expire on the shorter
/// `anonymous_ttl`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    entries: Arc<Mutex<HashMap<String, SessionEntry>>>,
    ttl: Duration,
    anonymous_ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration, anonymous_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            anonymous_ttl: anonymous_ttl.min(ttl),
        }
    }

    fn ttl_for(&self, data: &SessionData) -> Duration {
        if data.driver_id.is_some() {
            self.ttl
        } else {
            self.anonymous_ttl
        }
    }

    pub async fn create(&self, data: SessionData) -> String {
        let id = random_token();
        self.entries.lock().await.insert(
            id.clone(),
            SessionEntry {
                data,
                last_seen: Instant::now(),
            },
        );
        id
    }

    /// Returns the session if it has not expired, refreshing its expiry.
    pub async fn load(&self, id: &str) -> Option<SessionData> {
        let mut entries = self.entries.lock().await;
        let expired = entries.get(id).is_some_and(|entry| entry.expired(self));
        if expired {
            entries.remove(id);
            return None;
        }
        let entry = entries.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.data.clone())
    }

    pub async fn save(&self, id: &str, data: SessionData) {
        self.entries.lock().await.insert(
            id.to_string(),
            SessionEntry {
                data,
                last_seen: Instant::now(),
            },
        );
    }

    pub async fn remove(&self, id: &str) {
        self.entries.lock().await.remove(id);
    }

    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.expired(self));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[must_use]
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[must_use]
pub fn set_cookie_value(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

#[must_use]
pub fn clear_cookie_value() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// The caller's session as found in the cookie; empty when absent or expired.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session_id: Option<String>,
    pub data: SessionData,
}

impl SessionContext {
    #[must_use]
    pub fn actor(&self) -> Option<DriverId> {
        self.data.driver_id
    }

    pub fn require_actor(&self) -> Result<DriverId, ApiError> {
        self.actor().ok_or_else(ApiError::unauthorized)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SessionContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(id) = session_cookie(&parts.headers) else {
            return Ok(Self::default());
        };
        Ok(match state.sessions.load(&id).await {
            Some(data) => Self {
                session_id: Some(id),
                data,
            },
            None => Self::default(),
        })
    }
}
