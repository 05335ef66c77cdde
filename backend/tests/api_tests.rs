//! Integration tests for the diagnostics API.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use devdiag::create_app;
use devdiag::hostif::{ConfigurationSource, HostIfError};
use devdiag::state::{AppState, AppStateBuilder};
use devdiag::storage::{JsonParameterStore, ParameterStore};
use devdiag::telemetry::{report_enable_parameter, MarkerLog, ProfileCatalog};
use devdiag_types::api::{
    ConfigParameter, ConfigurationResponse, DecoderListResponse, DecoderStatusResponse,
    ErrorResponse, ReportProfilesResponse,
};
use devdiag_types::{DecoderKind, DecoderStatus, DiagEvent};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

/// Answers every configuration query with `"<name>-value"`.
struct FakeHostIf;

#[async_trait]
impl ConfigurationSource for FakeHostIf {
    async fn get_configuration(
        &self,
        names: &[String],
    ) -> Result<Vec<ConfigParameter>, HostIfError> {
        Ok(names
            .iter()
            .map(|name| ConfigParameter {
                name: name.clone(),
                value: json!(format!("{}-value", name)),
            })
            .collect())
    }
}

/// Always fails as if the daemon answered with an error status.
struct BrokenHostIf;

#[async_trait]
impl ConfigurationSource for BrokenHostIf {
    async fn get_configuration(
        &self,
        _names: &[String],
    ) -> Result<Vec<ConfigParameter>, HostIfError> {
        Err(HostIfError::Status(500))
    }
}

struct TestApp {
    app: Router,
    state: AppState,
    parameters: Arc<JsonParameterStore>,
    dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::with_configuration(Arc::new(FakeHostIf))
    }

    fn with_configuration(configuration: Arc<dyn ConfigurationSource>) -> Self {
        let dir = TempDir::new().unwrap();
        let profiles_file = dir.path().join("default.json");
        let persistent_dir = dir.path().join("persistent");
        std::fs::write(
            &profiles_file,
            r#"{"profiles":[{"name":"RDKB_Profile"},{"name":"Video_Profile"}]}"#,
        )
        .unwrap();
        std::fs::create_dir(&persistent_dir).unwrap();
        std::fs::write(persistent_dir.join("Xconf_Profile"), "{}").unwrap();

        let parameters = Arc::new(JsonParameterStore::new(dir.path().join("parameters.json")));
        let state = AppStateBuilder::new(configuration, parameters.clone())
            .profile_catalog(ProfileCatalog::new(profiles_file, persistent_dir))
            .markers(Arc::new(MarkerLog::new(Some(dir.path().join("markers.jsonl")))))
            .build();

        Self {
            app: create_app(state.clone()),
            state,
            parameters,
            dir,
        }
    }

    async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    async fn decoder_status(&self, kind: &str) -> DecoderStatus {
        let (status, body) = self
            .get(&format!("/api/diagnostics/decoders/{}/status", kind))
            .await;
        assert_eq!(status, StatusCode::OK);
        parse::<DecoderStatusResponse>(&body).decoder_status
    }

    /// Poll until the asynchronous feed has applied the expected status.
    async fn wait_for_status(&self, kind: &str, expected: DecoderStatus) {
        for _ in 0..100 {
            if self.decoder_status(kind).await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("{} decoder never reached {}", kind, expected);
    }

    async fn send_decoder_event(&self, kind: &str, pipeline: &str, status: &str) {
        let (code, _) = self
            .post(
                "/api/diagnostics/decoders/events",
                json!({ "kind": kind, "pipelineName": pipeline, "status": status }),
            )
            .await;
        assert_eq!(code, StatusCode::ACCEPTED);
    }
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let test = TestApp::new();

    let (status, body) = test.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_decoder_status_defaults_to_idle() {
    let test = TestApp::new();

    assert_eq!(test.decoder_status("video").await, DecoderStatus::Idle);
    assert_eq!(test.decoder_status("audio").await, DecoderStatus::Idle);

    let (status, body) = test.get("/api/diagnostics/video-decoder-status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, br#"{"decoderStatus":"IDLE"}"#);
}

#[tokio::test]
async fn test_unknown_decoder_kind() {
    let test = TestApp::new();

    let (status, body) = test.get("/api/diagnostics/decoders/subtitle/status").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse::<ErrorResponse>(&body).error, "Unknown decoder kind");
}

#[tokio::test]
async fn test_most_active_status_across_pipelines() {
    let test = TestApp::new();

    test.send_decoder_event("video", "main", "PAUSED").await;
    test.send_decoder_event("video", "pip", "ACTIVE").await;
    test.wait_for_status("video", DecoderStatus::Active).await;

    // Audio is tracked separately
    assert_eq!(test.decoder_status("audio").await, DecoderStatus::Idle);

    test.send_decoder_event("video", "pip", "IDLE").await;
    test.wait_for_status("video", DecoderStatus::Paused).await;

    let (status, body) = test.get("/api/diagnostics/decoders/video").await;
    assert_eq!(status, StatusCode::OK);
    let list: DecoderListResponse = parse(&body);
    let names: Vec<_> = list.pipelines.iter().map(|p| p.pipeline_name.as_str()).collect();
    assert_eq!(names, ["main", "pip"]);
}

#[tokio::test]
async fn test_unrecognized_status_is_ignored() {
    let test = TestApp::new();

    test.send_decoder_event("audio", "main", "PAUSED").await;
    test.wait_for_status("audio", DecoderStatus::Paused).await;

    test.send_decoder_event("audio", "main", "active").await;
    test.send_decoder_event("audio", "other", "PLAYING").await;
    // A recognized event after the junk proves the junk was already processed
    test.send_decoder_event("video", "marker", "ACTIVE").await;
    test.wait_for_status("video", DecoderStatus::Active).await;

    assert_eq!(test.decoder_status("audio").await, DecoderStatus::Paused);
    assert_eq!(test.state.decoders().len(DecoderKind::Audio), 1);
}

#[tokio::test]
async fn test_decoder_event_requires_pipeline_name() {
    let test = TestApp::new();

    let (status, _) = test
        .post(
            "/api/diagnostics/decoders/events",
            json!({ "kind": "video", "pipelineName": "", "status": "ACTIVE" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mistyped_bodies_are_bad_requests() {
    let test = TestApp::new();

    let cases = [
        (
            "/api/diagnostics/decoders/events",
            json!({ "kind": "hdmi", "pipelineName": "main", "status": "ACTIVE" }),
        ),
        (
            "/api/diagnostics/decoders/events",
            json!({ "kind": "video", "pipelineName": "main", "status": 1 }),
        ),
        ("/api/diagnostics/configuration", json!({ "names": "Device.X" })),
        (
            "/api/telemetry/report-profiles/status",
            json!({ "reportProfile": "Video_Profile", "status": 5 }),
        ),
        (
            "/api/telemetry/events",
            json!({ "eventName": "app_launch", "eventValue": 7 }),
        ),
    ];

    for (uri, body) in cases {
        let (status, response) = test.post(uri, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
        let error: ErrorResponse = parse(&response);
        assert_eq!(error.error, "Invalid request");
        assert!(error.details.is_some());
    }

    // Nothing reached the registry
    assert!(test.state.decoders().is_empty(DecoderKind::Video));
}

#[tokio::test]
async fn test_body_without_json_content_type() {
    let test = TestApp::new();

    let request = Request::builder()
        .uri("/api/telemetry/events")
        .method("POST")
        .body(Body::from(r#"{"eventName":"a","eventValue":"b"}"#))
        .unwrap();
    let (status, _) = test.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_configuration() {
    let test = TestApp::new();

    let (status, body) = test
        .post(
            "/api/diagnostics/configuration",
            json!({ "names": ["Device.DeviceInfo.SerialNumber"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let response: ConfigurationResponse = parse(&body);
    assert_eq!(response.param_list.len(), 1);
    assert_eq!(response.param_list[0].name, "Device.DeviceInfo.SerialNumber");
    assert_eq!(
        response.param_list[0].value,
        json!("Device.DeviceInfo.SerialNumber-value")
    );
}

#[tokio::test]
async fn test_get_configuration_rejects_empty_names() {
    let test = TestApp::new();

    let (status, _) = test
        .post("/api/diagnostics/configuration", json!({ "names": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_configuration_hostif_failure() {
    let test = TestApp::with_configuration(Arc::new(BrokenHostIf));

    let (status, body) = test
        .post("/api/diagnostics/configuration", json!({ "names": ["Device.X"] }))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(parse::<ErrorResponse>(&body).details.is_some());
}

#[tokio::test]
async fn test_list_report_profiles() {
    let test = TestApp::new();

    let (status, body) = test.get("/api/telemetry/report-profiles").await;
    assert_eq!(status, StatusCode::OK);

    let response: ReportProfilesResponse = parse(&body);
    let names: Vec<_> = response.report_profiles.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["RDKB_Profile", "Video_Profile", "Xconf_Profile"]);
}

#[tokio::test]
async fn test_set_report_profile_status() {
    let test = TestApp::new();
    let parameter = report_enable_parameter("Video_Profile");

    let (status, body) = test
        .post(
            "/api/telemetry/report-profiles/status",
            json!({ "reportProfile": "Video_Profile", "status": "COMPLETE" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"{}");
    assert_eq!(test.parameters.get_parameter(&parameter).await.unwrap().value, "true");

    let (status, _) = test
        .post(
            "/api/telemetry/report-profiles/status",
            json!({ "reportProfile": "Video_Profile", "status": "STARTED" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let stored = test.parameters.get_parameter(&parameter).await.unwrap();
    assert_eq!(stored.value, "false");
    assert_eq!(stored.caller_id, "Telemetry");
}

#[tokio::test]
async fn test_set_report_profile_status_errors() {
    let test = TestApp::new();
    let url = "/api/telemetry/report-profiles/status";

    let (status, body) = test.post(url, json!({ "reportProfile": "Video_Profile" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        parse::<ErrorResponse>(&body).error,
        "No 'reportProfile' or 'status' parameter"
    );

    let (status, _) = test
        .post(url, json!({ "reportProfile": "Video_Profile", "status": "DONE" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = test
        .post(url, json!({ "reportProfile": "Missing", "status": "COMPLETE" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nothing was written for the rejected requests
    assert!(test
        .parameters
        .get_parameter(&report_enable_parameter("Video_Profile"))
        .await
        .is_err());
}

#[tokio::test]
async fn test_log_application_event() {
    let test = TestApp::new();
    let mut events = test.state.events().receiver();

    let (status, _) = test
        .post(
            "/api/telemetry/events",
            json!({ "eventName": "app_launch", "eventValue": "netflix" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        event,
        DiagEvent::ApplicationEvent {
            event_name: "app_launch".to_string(),
            event_value: "netflix".to_string(),
        }
    );

    let markers = std::fs::read_to_string(test.dir.path().join("markers.jsonl")).unwrap();
    let line: Value = serde_json::from_str(markers.lines().next().unwrap()).unwrap();
    assert_eq!(line["eventName"], "app_launch");
    assert_eq!(line["eventValue"], "netflix");
}

#[tokio::test]
async fn test_log_application_event_missing_value() {
    let test = TestApp::new();

    let (status, body) = test
        .post("/api/telemetry/events", json!({ "eventName": "app_launch" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        parse::<ErrorResponse>(&body).error,
        "No 'eventName' or 'eventValue' parameter"
    );
}

#[tokio::test]
async fn test_version_and_openapi() {
    let test = TestApp::new();

    let (status, body) = test.get("/api/version").await;
    assert_eq!(status, StatusCode::OK);
    let version: Value = parse(&body);
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = test.get("/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = parse(&body);
    assert!(doc["paths"]["/api/diagnostics/decoders/{kind}/status"].is_object());
}

#[tokio::test]
async fn test_log_application_event_empty_name() {
    let test = TestApp::new();

    let (status, _) = test
        .post(
            "/api/telemetry/events",
            json!({ "eventName": "", "eventValue": "netflix" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // An empty value is forwarded as-is
    let (status, _) = test
        .post(
            "/api/telemetry/events",
            json!({ "eventName": "app_launch", "eventValue": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
