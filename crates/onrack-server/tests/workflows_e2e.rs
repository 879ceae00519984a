//! End-to-end tests for the workflow endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{json_body, object, test_app};
use onrack_services::{GraphHandle, GraphTarget};
use onrack_types::{GraphObject, Node};
use pretty_assertions::assert_eq;
use serde_json::{json, Map};

#[tokio::test]
async fn run_with_query_parameters() {
    let app = test_app().await;
    app.repos.nodes.create(Node::new("123")).await.unwrap();

    let response = app
        .send(
            Method::POST,
            "/api/1.1/nodes/123/workflows?name=TestGraph.Dummy&options%5Bprop%5D=555",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await,
        json!({ "instanceId": "0987", "name": "TestGraph.Dummy" })
    );

    assert_eq!(
        *app.task_graphs.runs.lock(),
        vec![(
            "TestGraph.Dummy".to_string(),
            object(json!({ "prop": "555" })),
            "123".to_string()
        )]
    );
}

#[tokio::test]
async fn run_with_json_body() {
    let app = test_app().await;
    app.repos.nodes.create(Node::new("123")).await.unwrap();

    let response = app
        .send(
            Method::POST,
            "/api/1.1/nodes/123/workflows",
            Some(json!({ "name": "TestGraph.Dummy", "options": { "prop": 555 } })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let runs = app.task_graphs.runs.lock().clone();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].1, object(json!({ "prop": 555 })));
}

#[tokio::test]
async fn run_without_options_passes_empty_map() {
    let app = test_app().await;
    app.repos
        .nodes
        .create(Node::new("123").with_identifier("00:11:22:33:44:55"))
        .await
        .unwrap();

    let response = app
        .send(
            Method::POST,
            "/api/1.1/nodes/00:11:22:33:44:55/workflows?name=Graph.Discovery",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let runs = app.task_graphs.runs.lock().clone();
    assert_eq!(
        runs,
        vec![("Graph.Discovery".to_string(), Map::new(), "123".to_string())]
    );
}

#[tokio::test]
async fn run_requires_a_valid_name() {
    let app = test_app().await;
    app.repos.nodes.create(Node::new("123")).await.unwrap();

    let response = app
        .send(Method::POST, "/api/1.1/nodes/123/workflows", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(
            Method::POST,
            "/api/1.1/nodes/123/workflows",
            Some(json!({ "name": "not a graph" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(app.task_graphs.runs.lock().is_empty());
}

#[tokio::test]
async fn run_against_missing_node_is_404() {
    let app = test_app().await;

    let response = app
        .send(
            Method::POST,
            "/api/1.1/nodes/123/workflows?name=TestGraph.Dummy",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.task_graphs.runs.lock().is_empty());
}

#[tokio::test]
async fn list_workflows_of_node() {
    let app = test_app().await;
    app.repos.nodes.create(Node::new("123")).await.unwrap();

    assert_eq!(
        app.get("/api/1.1/nodes/123/workflows").await.status(),
        StatusCode::NOT_FOUND
    );

    app.repos
        .graph_objects
        .upsert(GraphObject::running(
            "0987",
            "Graph.Discovery",
            Some("123".to_string()),
            Map::new(),
        ))
        .await
        .unwrap();

    let response = app.get("/api/1.1/nodes/123/workflows").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["instanceId"], "0987");
}

#[tokio::test]
async fn active_workflow_is_resolved_through_graph_objects() {
    let app = test_app().await;
    app.repos.nodes.create(Node::new("123")).await.unwrap();
    *app.task_graphs.active.lock() = Some(GraphHandle {
        instance_id: "0987".to_string(),
        name: "Graph.Discovery".to_string(),
    });
    app.repos
        .graph_objects
        .upsert(GraphObject::running(
            "0987",
            "Graph.Discovery",
            Some("123".to_string()),
            Map::new(),
        ))
        .await
        .unwrap();

    let response = app.get("/api/1.1/nodes/123/workflows/active").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["instanceId"], "0987");
    assert_eq!(body["name"], "Graph.Discovery");

    assert_eq!(
        *app.task_graphs.active_queries.lock(),
        vec![GraphTarget::new("123")]
    );
}

#[tokio::test]
async fn no_active_workflow_is_404() {
    let app = test_app().await;
    app.repos.nodes.create(Node::new("123")).await.unwrap();

    let response = app.get("/api/1.1/nodes/123/workflows/active").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Runner reports a graph the store does not know about.
    *app.task_graphs.active.lock() = Some(GraphHandle {
        instance_id: "missing".to_string(),
        name: "Graph.Discovery".to_string(),
    });
    let response = app.get("/api/1.1/nodes/123/workflows/active").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_active_workflow() {
    let app = test_app().await;
    app.repos.nodes.create(Node::new("123")).await.unwrap();

    let response = app
        .send(Method::DELETE, "/api/1.1/nodes/123/workflows/active", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "cancelled");

    assert_eq!(*app.task_graphs.cancels.lock(), vec![GraphTarget::new("123")]);
}
