//! # Nodes API
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/nodes` | List nodes |
//! | POST | `/nodes` | Create node |
//! | GET | `/nodes/{id}` | Get node |
//! | PATCH | `/nodes/{id}` | Update node |
//! | DELETE | `/nodes/{id}` | Delete node and its work items |
//! | GET | `/nodes/{id}/obm` | List OBM settings |
//! | POST | `/nodes/{id}/obm` | Append an OBM setting |
//! | POST | `/nodes/{id}/obm/identify` | Toggle the identify light |
//! | GET | `/nodes/{id}/catalogs` | List catalogs |
//! | GET | `/nodes/{id}/catalogs/{source}` | Latest catalog of a source |
//! | GET | `/nodes/{id}/pollers` | List pollers |

use crate::api::AppState;
use crate::error::ApiError;
use crate::observability::METRICS;
use crate::validation::{parse_json, parse_validated, IdentifyRequest, ObmSettingRequest};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use onrack_services::{NODE_CREATED, NODE_DELETED, NODE_OBM_IDENTIFY, NODE_UPDATED};
use onrack_store::WorkItemFilter;
use onrack_types::{Catalog, Node, ObmSetting, Poller};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

/// Node routes, relative to the API prefix.
pub fn node_routes() -> Router<AppState> {
    Router::new()
        .route("/nodes", get(list_nodes).post(create_node))
        .route(
            "/nodes/{id}",
            get(get_node).patch(patch_node).delete(delete_node),
        )
        .route("/nodes/{id}/obm", get(get_obm).post(add_obm))
        .route("/nodes/{id}/obm/identify", post(identify))
        .route("/nodes/{id}/catalogs", get(list_catalogs))
        .route("/nodes/{id}/catalogs/{source}", get(latest_catalog))
        .route("/nodes/{id}/pollers", get(list_pollers))
}

/// Looks a node up by id or identifier, mapping absence to 404.
pub(crate) async fn require_node(state: &AppState, identifier: &str) -> Result<Node, ApiError> {
    state
        .repos
        .nodes
        .find_by_identifier(identifier)
        .await?
        .ok_or_else(|| ApiError::node_not_found(identifier))
}

/// Recounts nodes for the inventory gauge after a create or delete.
async fn refresh_node_gauge(state: &AppState) {
    match state.repos.nodes.find().await {
        Ok(nodes) => METRICS.set_nodes(nodes.len()),
        Err(e) => warn!(error = %e, "Could not recount nodes"),
    }
}

async fn list_nodes(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let nodes = state.repos.nodes.find().await?;
    METRICS.set_nodes(nodes.len());
    Ok(Json(nodes))
}

async fn create_node(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let value: Value = parse_json(&body)?;
    let node = state.repos.nodes.create(Node::from_value(value)?).await?;

    info!(node = %node.id, "Node created");
    state.publish(NODE_CREATED, json!({ "id": node.id }));
    refresh_node_gauge(&state).await;
    Ok((StatusCode::CREATED, Json(node)))
}

async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(require_node(&state, &id).await?))
}

async fn patch_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let patch: Map<String, Value> = parse_json(&body)?;
    let node = state
        .repos
        .nodes
        .update_by_identifier(&id, patch)
        .await?
        .ok_or_else(|| ApiError::node_not_found(&id))?;

    state.publish(NODE_UPDATED, json!({ "id": node.id }));
    Ok(Json(node))
}

async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let node = state
        .repos
        .nodes
        .destroy_by_identifier(&id)
        .await?
        .ok_or_else(|| ApiError::node_not_found(&id))?;

    let removed = state
        .repos
        .work_items
        .destroy(&WorkItemFilter::node(node.id.clone()))
        .await?;

    info!(node = %node.id, work_items = removed.len(), "Node deleted");
    state.publish(NODE_DELETED, json!({ "id": node.id }));
    refresh_node_gauge(&state).await;
    Ok(Json(node))
}

async fn get_obm(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let node = require_node(&state, &id).await?;
    if node.obm_settings().is_empty() {
        return Err(ApiError::NotFound(format!("node {} has no OBM settings", id)));
    }
    Ok(Json(node.obm_settings().to_vec()))
}

async fn add_obm(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let node = require_node(&state, &id).await?;
    let request: ObmSettingRequest = parse_validated(&body)?;

    let settings = node.appended_obm_settings(ObmSetting::new(request.service, request.config));
    let mut patch = Map::new();
    patch.insert(
        "obmSettings".to_string(),
        serde_json::to_value(settings).map_err(|e| ApiError::Internal(e.to_string()))?,
    );

    let updated = state
        .repos
        .nodes
        .update_by_identifier(&id, patch)
        .await?
        .ok_or_else(|| ApiError::node_not_found(&id))?;

    state.publish(NODE_UPDATED, json!({ "id": updated.id }));
    Ok((StatusCode::CREATED, Json(updated)))
}

async fn identify(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let node = require_node(&state, &id).await?;
    let request: IdentifyRequest = parse_json(&body)?;

    let result = if request.value {
        state.obm.identify_on(&node.id).await?
    } else {
        state.obm.identify_off(&node.id).await?
    };

    state.publish(
        NODE_OBM_IDENTIFY,
        json!({ "id": node.id, "value": request.value }),
    );
    Ok(Json(result))
}

async fn list_catalogs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let joined = state
        .repos
        .nodes
        .find_with_catalogs(&id)
        .await?
        .ok_or_else(|| ApiError::node_not_found(&id))?;

    if joined.catalogs.is_empty() {
        return Err(ApiError::NotFound(format!("node {} has no catalogs", id)));
    }
    Ok(Json(joined.catalogs))
}

/// Every failure on this route is reported as 404.
async fn latest_catalog(
    State(state): State<AppState>,
    Path((id, source)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    match find_latest_catalog(&state, &id, &source).await {
        Ok(Some(catalog)) => Ok(Json(catalog)),
        Ok(None) => Err(ApiError::NotFound(format!(
            "no {} catalog for node {}",
            source, id
        ))),
        Err(e) => {
            warn!(node = %id, source = %source, error = %e, "Catalog lookup failed");
            Err(ApiError::NotFound(format!(
                "no {} catalog for node {}",
                source, id
            )))
        }
    }
}

async fn find_latest_catalog(
    state: &AppState,
    id: &str,
    source: &str,
) -> Result<Option<Catalog>, ApiError> {
    let Some(node) = state.repos.nodes.find_by_identifier(id).await? else {
        return Ok(None);
    };
    Ok(state
        .repos
        .catalogs
        .find_latest_catalog_of_source(&node.id, source)
        .await?)
}

async fn list_pollers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let node = require_node(&state, &id).await?;
    let pollers: Vec<Poller> = state
        .repos
        .work_items
        .find_pollers(&WorkItemFilter::node(node.id))
        .await?
        .iter()
        .map(Poller::from)
        .collect();
    Ok(Json(pollers))
}
