//! # Workflow API
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/nodes/{id}/workflows` | List graph objects run against the node |
//! | POST | `/nodes/{id}/workflows` | Run a task graph against the node |
//! | GET | `/nodes/{id}/workflows/active` | Get the active graph object |
//! | DELETE | `/nodes/{id}/workflows/active` | Cancel the active graph |
//!
//! `POST` reads `name` and `options` from the query string
//! (`?name=Graph.Discovery&options[prop]=555`) or from the JSON body. Query
//! values win and arrive as strings; body options keep their JSON types.

use crate::api::AppState;
use crate::error::ApiError;
use crate::nodes_api::require_node;
use crate::validation::{parse_json, validate_graph_name};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use onrack_services::GraphTarget;
use onrack_store::GraphObjectQuery;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Workflow routes, relative to the API prefix.
pub fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/nodes/{id}/workflows",
            get(list_workflows).post(run_workflow),
        )
        .route(
            "/nodes/{id}/workflows/active",
            get(get_active_workflow).delete(cancel_active_workflow),
        )
}

/// JSON body of a workflow run.
#[derive(Debug, Default, Deserialize)]
struct WorkflowBody {
    name: Option<String>,
    #[serde(default)]
    options: Map<String, Value>,
}

/// Name and options of a workflow run after merging query and body.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRequest {
    /// Graph name.
    pub name: String,
    /// Graph options.
    pub options: Map<String, Value>,
}

impl WorkflowRequest {
    /// Merges query-string parameters over the JSON body.
    pub fn resolve(query: &[(String, String)], body: &[u8]) -> Result<Self, ApiError> {
        let body: WorkflowBody = if body.iter().all(u8::is_ascii_whitespace) {
            WorkflowBody::default()
        } else {
            parse_json(body)?
        };

        let mut query_name = None;
        let mut query_options = Map::new();
        for (key, value) in query {
            if key == "name" {
                query_name = Some(value.clone());
            } else if let Some(option) = option_key(key) {
                query_options.insert(option.to_string(), Value::String(value.clone()));
            }
        }

        let name = query_name
            .or(body.name)
            .ok_or_else(|| ApiError::BadRequest("graph name is required".to_string()))?;
        validate_graph_name(&name).map_err(|e| {
            ApiError::BadRequest(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid graph name".to_string()),
            )
        })?;

        let options = if query_options.is_empty() {
            body.options
        } else {
            query_options
        };

        Ok(Self { name, options })
    }
}

/// Extracts `key` from `options[key]`.
fn option_key(param: &str) -> Option<&str> {
    param
        .strip_prefix("options[")
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|key| !key.is_empty())
}

async fn list_workflows(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let joined = state
        .repos
        .nodes
        .find_with_workflows(&id)
        .await?
        .ok_or_else(|| ApiError::node_not_found(&id))?;

    if joined.workflows.is_empty() {
        return Err(ApiError::NotFound(format!("node {} has no workflows", id)));
    }
    Ok(Json(joined.workflows))
}

async fn run_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let node = require_node(&state, &id).await?;
    let request = WorkflowRequest::resolve(&query, &body)?;

    let result = state
        .task_graphs
        .run_task_graph(&request.name, request.options, &node.id)
        .await?;

    tracing::info!(node = %node.id, graph = %request.name, "Workflow started");
    Ok((StatusCode::CREATED, Json(result)))
}

async fn get_active_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let node = require_node(&state, &id).await?;

    let handle = state
        .task_graphs
        .get_active_task_graph(&GraphTarget::new(node.id.clone()))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no active workflow for node {}", node.id)))?;

    let graph = state
        .repos
        .graph_objects
        .find_one(&GraphObjectQuery {
            instance_id: handle.instance_id.clone(),
        })
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("graph {} not found", handle.instance_id)))?;

    Ok(Json(graph))
}

async fn cancel_active_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let node = require_node(&state, &id).await?;
    let result = state
        .task_graphs
        .cancel_task_graph(&GraphTarget::new(node.id.clone()))
        .await?;

    tracing::info!(node = %node.id, "Workflow cancelled");
    Ok(Json(result))
}
