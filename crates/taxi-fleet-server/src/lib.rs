// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! HTTP surface of the fleet service: session handling, the login gate,
//! per-route handlers and the staff-only admin pages.

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use taxi_fleet_store::FleetStore;

pub mod admin;
mod config;
mod http;
mod middleware;
mod session;

pub use config::{
    validate_startup_config_contract, AdminBootstrap, ApiConfig, CONFIG_SCHEMA_VERSION,
};
pub use session::{SessionContext, SessionData, SessionStore, SESSION_COOKIE};

pub const CRATE_NAME: &str = "taxi-fleet-server";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FleetStore>,
    pub sessions: SessionStore,
    pub api: ApiConfig,
    pub request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<FleetStore>) -> Self {
        Self::with_config(store, ApiConfig::default())
    }

    #[must_use]
    pub fn with_config(store: Arc<FleetStore>, api: ApiConfig) -> Self {
        Self {
            store,
            sessions: SessionStore::new(api.session_ttl, api.anonymous_session_ttl),
            request_id_seed: Arc::new(AtomicU64::new(1)),
            api,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    use http::{accounts, admin, cars, drivers, manufacturers};

    Router::new()
        .route("/", get(accounts::index_handler))
        .route("/accounts/login/", post(accounts::login_handler))
        .route("/accounts/logout/", post(accounts::logout_handler))
        .route(
            "/manufacturers/",
            get(manufacturers::manufacturer_list_handler),
        )
        .route(
            "/manufacturers/create/",
            get(manufacturers::manufacturer_create_form_handler)
                .post(manufacturers::manufacturer_create_handler),
        )
        .route(
            "/manufacturers/:id/update/",
            get(manufacturers::manufacturer_update_form_handler)
                .post(manufacturers::manufacturer_update_handler),
        )
        .route(
            "/manufacturers/:id/delete/",
            get(manufacturers::manufacturer_delete_confirm_handler)
                .post(manufacturers::manufacturer_delete_handler),
        )
        .route("/cars/", get(cars::car_list_handler))
        .route(
            "/cars/create/",
            get(cars::car_create_form_handler).post(cars::car_create_handler),
        )
        .route("/cars/:id/", get(cars::car_detail_handler))
        .route(
            "/cars/:id/update/",
            get(cars::car_update_form_handler).post(cars::car_update_handler),
        )
        .route(
            "/cars/:id/toggle-assign/",
            post(cars::car_toggle_assign_handler),
        )
        .route(
            "/cars/:id/delete/",
            get(cars::car_delete_confirm_handler).post(cars::car_delete_handler),
        )
        .route("/drivers/", get(drivers::driver_list_handler))
        .route(
            "/drivers/create/",
            get(drivers::driver_create_form_handler).post(drivers::driver_create_handler),
        )
        .route("/drivers/:id/", get(drivers::driver_detail_handler))
        .route(
            "/drivers/:id/update/",
            get(drivers::driver_license_form_handler)
                .post(drivers::driver_license_update_handler),
        )
        .route(
            "/drivers/:id/delete/",
            get(drivers::driver_delete_confirm_handler).post(drivers::driver_delete_handler),
        )
        .route("/admin/", get(admin::admin_index_handler))
        .route("/admin/taxi/:model/", get(admin::admin_changelist_handler))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
