// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;
use taxi_fleet_core::resolve_database_path;
use taxi_fleet_server::{
    build_router, validate_startup_config_contract, AdminBootstrap, ApiConfig, AppState,
};
use taxi_fleet_store::FleetStore;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

fn env_admin_bootstrap() -> Option<AdminBootstrap> {
    let username = env::var("TAXI_ADMIN_USERNAME").ok()?;
    if username.trim().is_empty() {
        return None;
    }
    Some(AdminBootstrap {
        username,
        password: env::var("TAXI_ADMIN_PASSWORD").unwrap_or_default(),
        license_number: env::var("TAXI_ADMIN_LICENSE").unwrap_or_default(),
    })
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                warn!("signal handlers unavailable, falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("TAXI_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env::var("TAXI_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let db_path = resolve_database_path();

    let api_cfg = ApiConfig {
        max_body_bytes: env_usize("TAXI_MAX_BODY_BYTES", 16 * 1024),
        store_timeout: env_duration_ms("TAXI_STORE_TIMEOUT_MS", 2000),
        session_ttl: env_duration_ms("TAXI_SESSION_TTL_MS", 14 * 24 * 3600 * 1000),
        anonymous_session_ttl: env_duration_ms("TAXI_ANON_SESSION_TTL_MS", 30 * 60 * 1000),
        shutdown_drain: env_duration_ms("TAXI_SHUTDOWN_DRAIN_MS", 2000),
        ..ApiConfig::default()
    };
    let admin = env_admin_bootstrap();
    validate_startup_config_contract(&api_cfg, admin.as_ref())?;

    let store = FleetStore::open(&db_path)
        .map_err(|e| format!("failed to open database {}: {e}", db_path.display()))?;
    info!(path = %db_path.display(), "fleet database ready");
    if let Some(admin) = admin {
        let account = admin
            .to_new_driver()
            .map_err(|e| format!("invalid admin bootstrap account: {e}"))?;
        match store.ensure_staff_account(&account) {
            Ok(true) => info!(username = %admin.username, "staff account created"),
            Ok(false) => info!(username = %admin.username, "staff account already present"),
            Err(e) => error!("staff account bootstrap failed: {e}"),
        }
    }

    let state = AppState::with_config(Arc::new(store), api_cfg);
    let app = build_router(state.clone());

    let sessions = state.sessions.clone();
    let purge_every = state.api.session_purge_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(purge_every);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                info!(purged, "expired sessions purged");
            }
        }
    });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!("taxi-fleet-server listening on {bind_addr}");
    let drain = state.api.shutdown_drain;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            info!("shutdown requested, draining");
            tokio::time::sleep(drain).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
