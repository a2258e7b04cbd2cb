// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use oj_core::clock::SystemClock;
use oj_proactive::ProactiveConfig;
use oj_storage::JobStore;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::metrics::Metrics;
use crate::state::AppState;

const GATEWAY_TOKEN: &str = "gateway-token-0123456789";
const WORKER_TOKEN: &str = "worker-token-01234567890";

struct NoopSink;

impl oj_proactive::ConfigSink for NoopSink {
    fn persist(&self, _config: &ProactiveConfig) -> std::io::Result<()> {
        Ok(())
    }
}

fn harness() -> (axum::Router, tempfile::TempDir) {
    harness_with_config(ProactiveConfig::default())
}

fn harness_with_config(config: ProactiveConfig) -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JobStore::load(dir.path().join("state.json"), SystemClock));
    let sink: Arc<dyn oj_proactive::ConfigSink> = Arc::new(NoopSink);
    let proactive = Arc::new(oj_proactive::ProactiveRuntime::new(config, store.clone(), SystemClock, sink));
    let state = AppState {
        store,
        proactive,
        metrics: Arc::new(Metrics::default()),
        gateway_token: Arc::from(GATEWAY_TOKEN),
        worker_token: Arc::from(WORKER_TOKEN),
    };
    (super::build(state), dir)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn gateway_req(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {GATEWAY_TOKEN}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn worker_req(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {WORKER_TOKEN}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn healthz_requires_no_auth() {
    let (router, _dir) = harness();
    let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let res = router.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_job_without_bearer_is_unauthorized() {
    let (router, _dir) = harness();
    let req = Request::builder()
        .method("POST")
        .uri("/v1/jobs")
        .header("content-type", "application/json")
        .body(Body::from(json!({}).to_string()))
        .unwrap();
    let res = router.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(res).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn create_job_then_fetch_round_trips() {
    let (router, _dir) = harness();
    let body = json!({
        "prompt": "summarize the inbox",
        "channel": "slack",
        "chatId": "C1",
        "requesterId": "U1",
    });
    let res = router.clone().oneshot(gateway_req("POST", "/v1/jobs", body)).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = json_body(res).await;
    let id = created["job"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["job"]["status"], "queued");

    let req = Request::builder()
        .uri(format!("/v1/jobs/{id}"))
        .header("authorization", format!("Bearer {GATEWAY_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let res = router.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched = json_body(res).await;
    assert_eq!(fetched["job"]["id"], id);
}

#[tokio::test]
async fn get_unknown_job_is_not_found() {
    let (router, _dir) = harness();
    let req = Request::builder()
        .uri("/v1/jobs/job-doesnotexist0000000")
        .header("authorization", format!("Bearer {GATEWAY_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let res = router.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_job_requiring_approval_then_approve_enqueues_it() {
    let (router, _dir) = harness();
    let body = json!({
        "prompt": "deploy to prod",
        "channel": "slack",
        "chatId": "C1",
        "requesterId": "U1",
        "requiresApproval": true,
    });
    let res = router.clone().oneshot(gateway_req("POST", "/v1/jobs", body)).await.unwrap();
    let created = json_body(res).await;
    assert_eq!(created["job"]["status"], "needs_approval");
    let id = created["job"]["id"].as_str().unwrap().to_string();

    let res = router.clone().oneshot(gateway_req("POST", &format!("/v1/jobs/{id}/approve"), json!({}))).await.unwrap();
    let approved = json_body(res).await;
    assert_eq!(approved["job"]["status"], "queued");

    let claim = router
        .oneshot(worker_req("POST", "/v1/workers/claim", json!({ "workerId": "w1" })))
        .await
        .unwrap();
    let claimed = json_body(claim).await;
    assert_eq!(claimed["job"]["id"], id);
    assert_eq!(claimed["job"]["status"], "running");
}

#[tokio::test]
async fn abort_queued_job_is_immediate() {
    let (router, _dir) = harness();
    let body = json!({
        "prompt": "noop",
        "channel": "slack",
        "chatId": "C1",
        "requesterId": "U1",
    });
    let res = router.clone().oneshot(gateway_req("POST", "/v1/jobs", body)).await.unwrap();
    let created = json_body(res).await;
    let id = created["job"]["id"].as_str().unwrap().to_string();

    let res = router.oneshot(gateway_req("POST", &format!("/v1/jobs/{id}/abort"), json!({}))).await.unwrap();
    let aborted = json_body(res).await;
    assert_eq!(aborted["job"]["status"], "aborted");
}

#[tokio::test]
async fn worker_lifecycle_complete_round_trip() {
    let (router, _dir) = harness();
    let body = json!({
        "prompt": "hello",
        "channel": "slack",
        "chatId": "C1",
        "requesterId": "U1",
    });
    let res = router.clone().oneshot(gateway_req("POST", "/v1/jobs", body)).await.unwrap();
    let created = json_body(res).await;
    let id = created["job"]["id"].as_str().unwrap().to_string();

    router
        .clone()
        .oneshot(worker_req("POST", "/v1/workers/claim", json!({ "workerId": "w1" })))
        .await
        .unwrap();

    let heartbeat = router
        .clone()
        .oneshot(worker_req("GET", &format!("/v1/workers/{id}/heartbeat"), json!({})))
        .await
        .unwrap();
    let heartbeat = json_body(heartbeat).await;
    assert_eq!(heartbeat["abortRequested"], false);

    let event = json!({
        "event": { "type": "agent_text_delta", "ts": "2026-01-01T00:00:00Z", "data": { "delta": "hi" } }
    });
    let res = router.clone().oneshot(worker_req("POST", &format!("/v1/workers/{id}/events"), event)).await.unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let res = router
        .clone()
        .oneshot(worker_req("POST", &format!("/v1/workers/{id}/complete"), json!({ "resultText": "hi" })))
        .await
        .unwrap();
    let completed = json_body(res).await;
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["resultText"], "hi");
}

#[tokio::test]
async fn admin_pause_blocks_claim() {
    let (router, _dir) = harness();
    let body = json!({
        "prompt": "hello",
        "channel": "slack",
        "chatId": "C1",
        "requesterId": "U1",
    });
    router.clone().oneshot(gateway_req("POST", "/v1/jobs", body)).await.unwrap();

    let res = router.clone().oneshot(gateway_req("POST", "/v1/admin/pause", json!({ "reason": "maintenance" }))).await.unwrap();
    let paused = json_body(res).await;
    assert_eq!(paused["paused"], true);

    let claim = router
        .clone()
        .oneshot(worker_req("POST", "/v1/workers/claim", json!({ "workerId": "w1" })))
        .await
        .unwrap();
    let claimed = json_body(claim).await;
    assert!(claimed["job"].is_null());

    let res = router.oneshot(gateway_req("POST", "/v1/admin/resume", json!({}))).await.unwrap();
    let resumed = json_body(res).await;
    assert_eq!(resumed["paused"], false);
}

#[tokio::test]
async fn heartbeat_rule_upsert_and_delete() {
    let (router, _dir) = harness();
    let rule = json!({
        "id": "rise-and-shine",
        "everySeconds": 60,
        "prompt": "good morning",
        "delivery": { "mode": "announce" },
        "target": {
            "kind": "slack",
            "chatId": "C1",
            "requesterId": "U1",
            "sessionKey": "S1",
        },
    });
    let res = router
        .clone()
        .oneshot(gateway_req("POST", "/v1/proactive/rules/heartbeat", rule))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let config = json_body(res).await;
    assert_eq!(config["heartbeatRules"].as_array().unwrap().len(), 1);

    let req = Request::builder()
        .method("DELETE")
        .uri("/v1/proactive/rules/heartbeat/rise-and-shine")
        .header("authorization", format!("Bearer {GATEWAY_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let res = router.oneshot(req).await.unwrap();
    let config = json_body(res).await;
    assert_eq!(config["heartbeatRules"].as_array().unwrap().len(), 0);
}

fn webhook_target() -> oj_proactive::Target {
    oj_proactive::Target {
        kind: "slack".to_string(),
        chat_id: "C1".to_string(),
        thread_id: None,
        requester_id: "U1".to_string(),
        session_key: "S1".to_string(),
        requires_approval: false,
        metadata: Default::default(),
    }
}

#[tokio::test]
async fn webhook_ingress_rejects_wrong_secret_and_unknown_id() {
    let mut config = ProactiveConfig::default();
    config.webhooks.push(oj_proactive::WebhookRule {
        id: "inbound".to_string(),
        secret: "0123456789abcdef".to_string(),
        prompt: "handle webhook".to_string(),
        include_payload_in_prompt: false,
        target: webhook_target(),
    });
    let (router, _dir) = harness_with_config(config);

    let wrong_secret = Request::builder()
        .method("POST")
        .uri("/v1/proactive/webhooks/inbound")
        .header("x-webhook-secret", "wrong-secret")
        .header("content-type", "application/json")
        .body(Body::from(json!({}).to_string()))
        .unwrap();
    let res = router.clone().oneshot(wrong_secret).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let unknown_id = Request::builder()
        .method("POST")
        .uri("/v1/proactive/webhooks/does-not-exist")
        .header("x-webhook-secret", "0123456789abcdef")
        .header("content-type", "application/json")
        .body(Body::from(json!({}).to_string()))
        .unwrap();
    let res = router.clone().oneshot(unknown_id).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let correct = Request::builder()
        .method("POST")
        .uri("/v1/proactive/webhooks/inbound")
        .header("x-webhook-secret", "0123456789abcdef")
        .header("content-type", "application/json")
        .body(Body::from(json!({}).to_string()))
        .unwrap();
    let res = router.oneshot(correct).await.unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body = json_body(res).await;
    assert_eq!(body["status"], "enqueued");
}

#[tokio::test]
async fn tools_invoke_unknown_tool_is_bad_request() {
    let (router, _dir) = harness();
    let res = router
        .oneshot(gateway_req("POST", "/v1/tools/invoke", json!({ "tool": "nonexistent.thing" })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
