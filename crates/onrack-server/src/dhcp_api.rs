//! DHCP whitelist endpoints.
//!
//! The whitelist lives in the configuration store under `whitelist` as an
//! array of MAC addresses in hyphen form (`00-11-22-33-44-55`).

use crate::api::AppState;
use crate::error::ApiError;
use crate::observability::METRICS;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Router,
};
use onrack_types::{MacAddress, Whitelist, WHITELIST_KEY};
use tracing::info;

/// Whitelist routes, relative to the API prefix.
pub fn dhcp_routes() -> Router<AppState> {
    Router::new().route(
        "/nodes/{id}/dhcp/whitelist",
        post(add_to_whitelist).delete(remove_from_whitelist),
    )
}

fn parse_mac(raw: &str) -> Result<MacAddress, ApiError> {
    MacAddress::parse(raw).map_err(ApiError::from)
}

fn load_whitelist(state: &AppState) -> Result<Whitelist, ApiError> {
    Whitelist::from_value(state.configuration.get(WHITELIST_KEY))
        .map_err(|e| ApiError::Internal(format!("stored whitelist is invalid: {}", e)))
}

fn store_whitelist(state: &AppState, whitelist: &Whitelist) {
    state.configuration.set(WHITELIST_KEY, whitelist.to_value());
    METRICS.set_whitelist_size(whitelist.len());
}

async fn add_to_whitelist(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mac = parse_mac(&mac)?;
    let _guard = state.whitelist_lock.lock().await;

    let mut whitelist = load_whitelist(&state)?;
    if whitelist.add(&mac) {
        store_whitelist(&state, &whitelist);
        info!(mac = %mac, "Added to DHCP whitelist");
    }

    Ok(StatusCode::CREATED)
}

async fn remove_from_whitelist(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mac = parse_mac(&mac)?;
    let _guard = state.whitelist_lock.lock().await;

    let mut whitelist = load_whitelist(&state)?;
    if whitelist.remove(&mac) {
        store_whitelist(&state, &whitelist);
        info!(mac = %mac, "Removed from DHCP whitelist");
    }

    Ok(StatusCode::NO_CONTENT)
}
