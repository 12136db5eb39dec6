//! End-to-end smoke tests for the full shutterhubd stack.
//!
//! Each test wires the real catalogs, event bus, dispatcher, and axum
//! router around a recording stub gateway, then exercises the HTTP layer
//! via `tower::ServiceExt::oneshot` — no TCP port is bound and no real
//! vendor gateway is contacted.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use shutterhub_adapter_http_axum::router::{self, RouterConfig};
use shutterhub_adapter_http_axum::state::AppState;
use shutterhub_app::dispatcher::CommandDispatcher;
use shutterhub_app::event_bus::EventBus;
use shutterhub_app::ports::{ExecutionId, GatewayClient, GatewayCommand, GatewayDeviceState};
use shutterhub_domain::device::{Device, DeviceGroup};
use shutterhub_domain::directory::DeviceDirectory;
use shutterhub_domain::error::GatewayError;
use shutterhub_domain::id::DeviceUrl;
use shutterhub_domain::schedule::Schedule;

// base64("admin:secret")
const AUTH_HEADER: &str = "Basic YWRtaW46c2VjcmV0";

#[derive(Clone, Default)]
struct RecordingGateway {
    executed: Arc<Mutex<Vec<Vec<GatewayCommand>>>>,
    device_states: Arc<Mutex<Vec<GatewayDeviceState>>>,
}

impl RecordingGateway {
    fn executions(&self) -> Vec<Vec<GatewayCommand>> {
        self.executed.lock().unwrap().clone()
    }

    async fn wait_for_executions(&self, count: usize) -> Vec<Vec<GatewayCommand>> {
        for _ in 0..200 {
            let executions = self.executions();
            if executions.len() >= count {
                return executions;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("gateway never saw {count} execution(s)");
    }
}

impl GatewayClient for RecordingGateway {
    async fn execute(&self, commands: Vec<GatewayCommand>) -> Result<ExecutionId, GatewayError> {
        self.executed.lock().unwrap().push(commands);
        Ok(ExecutionId("exec-1".to_string()))
    }

    async fn list_devices(&self) -> Result<Vec<GatewayDeviceState>, GatewayError> {
        Ok(self.device_states.lock().unwrap().clone())
    }
}

/// Build a fully-wired router backed by the recording gateway.
fn app(gateway: RecordingGateway) -> axum::Router {
    let devices: Vec<Device> = serde_json::from_str(
        r#"[
            {"uid": "d1", "name": "Bedroom left", "deviceUrl": "io://1234/AAA"},
            {"uid": "d2", "name": "Bedroom right", "deviceUrl": "io://1234/BBB"}
        ]"#,
    )
    .unwrap();
    let groups: Vec<DeviceGroup> = serde_json::from_str(
        r#"[
            {"uid": "g1", "name": "Bedroom", "devices": ["d1", "d2"]}
        ]"#,
    )
    .unwrap();
    let schedules: Vec<Schedule> = serde_json::from_str(
        r#"[
            {
                "type": "fixed_time",
                "uid": "morning-up",
                "dow": ["mon"],
                "deviceGroups": ["g1"],
                "command": {"name": "up", "parameters": []},
                "time": "07:30",
                "timezone": "Europe/Amsterdam"
            }
        ]"#,
    )
    .unwrap();

    let directory = Arc::new(DeviceDirectory::new(devices, groups));
    let bus = EventBus::new();

    let dispatcher = CommandDispatcher::new(gateway);
    let _subscriptions = dispatcher.start(&bus);

    let state = AppState::new(bus, directory, schedules);
    let config = RouterConfig {
        username: "admin".to_string(),
        password: "secret".to_string(),
        allowed_origins: vec!["http://localhost:8080".to_string()],
    };
    router::build(state, &config)
}

fn authed_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, AUTH_HEADER)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let resp = app(RecordingGateway::default())
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_reject_command_posts_without_credentials() {
    let resp = app(RecordingGateway::default())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/shutter/down")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"devices": ["d1"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_drive_a_command_post_all_the_way_to_the_gateway() {
    let gateway = RecordingGateway::default();
    let resp = app(gateway.clone())
        .oneshot(authed_post("/shutter/down", r#"{"devices": ["d1", "d2"]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);

    let executions = gateway.wait_for_executions(1).await;
    assert_eq!(executions.len(), 1);
    assert_eq!(
        executions[0],
        vec![
            GatewayCommand::parameterless(DeviceUrl::from("io://1234/AAA"), "down"),
            GatewayCommand::parameterless(DeviceUrl::from("io://1234/BBB"), "down"),
        ]
    );
}

#[tokio::test]
async fn should_substitute_stop_for_my_when_a_shutter_is_moving() {
    let gateway = RecordingGateway::default();
    *gateway.device_states.lock().unwrap() = vec![GatewayDeviceState {
        device_url: DeviceUrl::from("io://1234/AAA"),
        is_moving: true,
    }];

    let resp = app(gateway.clone())
        .oneshot(authed_post("/shutter/my", r#"{"devices": ["d1", "d2"]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);

    let executions = gateway.wait_for_executions(1).await;
    assert_eq!(executions[0].len(), 2);
    assert!(executions[0].iter().all(|cmd| cmd.name == "stop"));
}

#[tokio::test]
async fn should_execute_a_schedule_on_demand() {
    let gateway = RecordingGateway::default();
    let resp = app(gateway.clone())
        .oneshot(authed_post(
            "/schedule/execute",
            r#"{"schedule": "morning-up"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);

    let executions = gateway.wait_for_executions(1).await;
    assert_eq!(
        executions[0],
        vec![
            GatewayCommand::parameterless(DeviceUrl::from("io://1234/AAA"), "up"),
            GatewayCommand::parameterless(DeviceUrl::from("io://1234/BBB"), "up"),
        ]
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_schedule() {
    let gateway = RecordingGateway::default();
    let resp = app(gateway.clone())
        .oneshot(authed_post("/schedule/execute", r#"{"schedule": "ghost"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(gateway.executions().is_empty());
}

#[tokio::test]
async fn should_expose_catalog_views_with_authentication() {
    let resp = app(RecordingGateway::default())
        .oneshot(
            Request::builder()
                .uri("/shutter/schedules")
                .header(header::AUTHORIZATION, AUTH_HEADER)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json[0]["uid"], "morning-up");
    assert_eq!(json[0]["deviceGroups"][0]["devices"][0]["uid"], "d1");
}
