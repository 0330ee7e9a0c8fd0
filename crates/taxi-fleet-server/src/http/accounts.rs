// SPDX-License-Identifier: Apache-2.0

use crate::http::handlers_utilities::{
    json_view, run_store, see_other, with_set_cookie, HandlerResult,
};
use crate::session::{clear_cookie_value, set_cookie_value, SessionContext, SessionData};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::json;
use taxi_fleet_api::params::parse_form;
use taxi_fleet_api::{ApiError, HomeDto, LoginForm, LOGIN_PATH};
use tracing::info;

const LOGIN_REDIRECT: &str = "/";

/// Home page: fleet counts and the per-session visit counter.
pub(crate) async fn index_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> HandlerResult {
    let counts = run_store(&state, "fleet_counts", |s| s.fleet_counts()).await?;
    let data = SessionData {
        num_visits: ctx.data.num_visits + 1,
        ..ctx.data
    };
    let body = HomeDto {
        num_drivers: counts.drivers,
        num_manufacturers: counts.manufacturers,
        num_cars: counts.cars,
        num_visits: data.num_visits,
    };
    let response = json_view(&body);
    Ok(match ctx.session_id {
        Some(id) => {
            state.sessions.save(&id, data).await;
            response
        }
        None => {
            let id = state.sessions.create(data).await;
            with_set_cookie(response, &set_cookie_value(&id))
        }
    })
}

pub(crate) async fn login_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
    body: Bytes,
) -> HandlerResult {
    let form: LoginForm = parse_form(&body)?;
    let driver = run_store(&state, "authenticate", move |s| {
        s.authenticate(&form.username, &form.password)
    })
    .await?;
    let Some(driver) = driver else {
        return Err(ApiError::validation_failed(json!([{
            "field": "__all__",
            "code": "invalid_login",
            "message": "please enter a correct username and password"
        }]))
        .into());
    };
    if let Some(old) = &ctx.session_id {
        state.sessions.remove(old).await;
    }
    let id = state
        .sessions
        .create(SessionData {
            driver_id: Some(driver.id),
            num_visits: ctx.data.num_visits,
        })
        .await;
    info!(driver_id = driver.id.get(), "driver logged in");
    Ok(with_set_cookie(
        see_other(LOGIN_REDIRECT),
        &set_cookie_value(&id),
    ))
}

pub(crate) async fn logout_handler(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> HandlerResult {
    if let Some(id) = &ctx.session_id {
        state.sessions.remove(id).await;
    }
    if let Some(driver) = ctx.actor() {
        info!(driver_id = driver.get(), "driver logged out");
    }
    Ok(with_set_cookie(see_other(LOGIN_PATH), &clear_cookie_value()))
}
