//! REST API integration tests for the MRT-MQTT control plane (§6, §8).
//!
//! Exercises `/mrt/register_flow` and `/mrt/register_subscriber` through
//! axum's tower service interface (no TCP), mirroring the teacher crate's
//! `tests/api_integration.rs` shape — but against an in-memory `OfDbHandle`
//! instead of a Postgres pool, since this control plane keeps no
//! persistence across restarts (§1).

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use mrt_common::config::Config;
use mrt_common::model::Link;
use mrt_dataplane::LoggingProgrammer;
use mrt_topology::OfDbHandle;

async fn test_app() -> (Router, OfDbHandle) {
    let of_db = OfDbHandle::new();
    {
        let mut db = of_db.lock().await;
        for (src, dst, port) in [("1", "2", 1u16), ("1", "3", 2), ("2", "4", 1), ("3", "4", 1)] {
            let mut link = Link::new(src, dst, port);
            link.prop_delay = 5.0;
            link.bw_capacity = 100.0;
            db.add_link(link);
        }
    }

    let dataplane: Arc<dyn mrt_dataplane::DataPlaneProgrammer> = Arc::new(LoggingProgrammer::new());
    let state = mrt_control::state::AppState::new(of_db.clone(), dataplane, Config::default());

    let app = Router::new()
        .nest("/mrt", mrt_control::api::router())
        .with_state(state);

    (app, of_db)
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        let text = String::from_utf8_lossy(&bytes);
        panic!("not valid JSON: {text}");
    })
}

fn json_post(uri: &str, body: serde_json::Value) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn register_flow_with_feasible_attributes_is_admitted() {
    let (app, _) = test_app().await;

    let resp = app
        .oneshot(json_post(
            "/mrt/register_flow",
            serde_json::json!({
                "topic": "sensors/temp",
                "rt_attributes": {
                    "qi": 0, "ci": 1.0, "pi": 5, "ti": 100.0, "di": 100.0, "bwi": 2.0,
                    "dst_ips": ["4"]
                },
                "src_ip": "1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body = json_body(resp).await;
    assert_eq!(body["topic"], "sensors/temp");
    assert!(body["multicast_group_id"].as_u64().unwrap() > 0);
}

/// S1 from spec.md §8: the WCRT bound (10.5ms) exceeds the 10ms deadline,
/// so admission must reject with 503 and leave no partial state.
#[tokio::test]
async fn s1_infeasible_flow_is_rejected_with_503() {
    let (app, of_db) = test_app().await;

    let resp = app
        .oneshot(json_post(
            "/mrt/register_flow",
            serde_json::json!({
                "topic": "A",
                "rt_attributes": {
                    "qi": 0, "ci": 0.5, "pi": 10, "ti": 20.0, "di": 10.0, "bwi": 1.0,
                    "dst_ips": ["4"]
                },
                "src_ip": "1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), 503);

    let db = of_db.lock().await;
    assert!(db.get_flow("A").is_none());
}

#[tokio::test]
async fn register_flow_missing_topic_is_a_400() {
    let (app, _) = test_app().await;

    let resp = app
        .oneshot(json_post(
            "/mrt/register_flow",
            serde_json::json!({
                "topic": "",
                "rt_attributes": {
                    "qi": 0, "ci": 1.0, "pi": 5, "ti": 100.0, "di": 100.0, "bwi": 1.0,
                    "dst_ips": ["4"]
                },
                "src_ip": "1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn register_flow_invalid_qos_class_is_a_400() {
    let (app, _) = test_app().await;

    let resp = app
        .oneshot(json_post(
            "/mrt/register_flow",
            serde_json::json!({
                "topic": "t",
                "rt_attributes": {
                    "qi": 9, "ci": 1.0, "pi": 5, "ti": 100.0, "di": 100.0, "bwi": 1.0,
                    "dst_ips": ["4"]
                },
                "src_ip": "1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn register_subscriber_grafts_onto_an_admitted_flow() {
    let (app, of_db) = test_app().await;

    let resp = app
        .clone()
        .oneshot(json_post(
            "/mrt/register_flow",
            serde_json::json!({
                "topic": "D",
                "rt_attributes": {
                    "qi": 0, "ci": 1.0, "pi": 5, "ti": 100.0, "di": 100.0, "bwi": 1.0,
                    "dst_ips": ["3"]
                },
                "src_ip": "1"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .oneshot(json_post(
            "/mrt/register_subscriber",
            serde_json::json!({ "topic": "D", "subscriber_ip": "4" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let db = of_db.lock().await;
    let flow = db.get_flow("D").unwrap();
    assert!(flow.dst_ips.contains(&"4".to_string()));
    assert_eq!(flow.route_links.len(), 2, "tree should now cover both 3 and 4");
}

#[tokio::test]
async fn register_subscriber_missing_fields_is_a_400() {
    let (app, _) = test_app().await;

    let resp = app
        .oneshot(json_post(
            "/mrt/register_subscriber",
            serde_json::json!({ "topic": "", "subscriber_ip": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn repeat_subscriber_join_is_idempotent() {
    let (app, of_db) = test_app().await;

    app.clone()
        .oneshot(json_post(
            "/mrt/register_flow",
            serde_json::json!({
                "topic": "D",
                "rt_attributes": {
                    "qi": 0, "ci": 1.0, "pi": 5, "ti": 100.0, "di": 100.0, "bwi": 1.0,
                    "dst_ips": ["3"]
                },
                "src_ip": "1"
            }),
        ))
        .await
        .unwrap();

    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(json_post(
                "/mrt/register_subscriber",
                serde_json::json!({ "topic": "D", "subscriber_ip": "4" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let db = of_db.lock().await;
    let flow = db.get_flow("D").unwrap();
    assert_eq!(flow.dst_ips.iter().filter(|d| *d == "4").count(), 1);
    let link = db.get_link(&flow.route_links[0].key()).unwrap();
    assert_eq!(link.bw_used, 1.0, "repeated join must not double-count bandwidth");
}
