#![allow(dead_code)] // Test helpers appear unused when compiled independently

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

pub const MOCK_TOKEN: &str = "mock-token";
pub const MOCK_SECRET: &str = "mock-secret";

pub const PUBLISH_XML: &str = r#"<publishData>
  <publishProfile profileName="func - Web Deploy" publishMethod="MSDeploy" publishUrl="func.scm.azurewebsites.net:443" userName="$func" userPWD="pw"><databases /></publishProfile>
  <publishProfile profileName="func - Zip Deploy" publishMethod="ZipDeploy" publishUrl="func.scm.azurewebsites.net:443" userName="$func" userPWD="pw"><databases /></publishProfile>
</publishData>"#;

/// A request captured by the mock
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    requests: Vec<Recorded>,
    status_reads: HashMap<String, usize>,
}

#[derive(Clone, Default)]
struct MockState {
    inner: Arc<Mutex<Inner>>,
    /// Logic Apps that exist, by name, with their location
    logic_apps: Arc<HashMap<String, String>>,
}

pub struct MockAzure {
    state: MockState,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
    pub base_url: String,
    pub host: String,
}

impl MockAzure {
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }

    pub async fn requests(&self) -> Vec<Recorded> {
        self.state.inner.lock().await.requests.clone()
    }

    pub async fn requests_to(&self, fragment: &str) -> Vec<Recorded> {
        self.requests()
            .await
            .into_iter()
            .filter(|r| r.path.contains(fragment))
            .collect()
    }
}

/// Best-effort check for whether binding to loopback is permitted in the current sandbox.
pub async fn can_bind_loopback() -> bool {
    match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => {
            drop(listener);
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => false,
        Err(_) => true, // treat other errors as non-fatal for skipping
    }
}

/// Spawn a mock of the identity platform, ARM and Kudu on one loopback port.
///
/// Behaviour is keyed by names:
/// - sites `quirky` answer trigger sync with 200, `clean` with 204, anything else 404
/// - deployments whose name contains `broken` fail, others succeed on the second status read
/// - ZIP uploads by user `$reject` get 409
pub async fn spawn_mock_azure(logic_apps: &[(&str, &str)]) -> MockAzure {
    let state = MockState {
        inner: Arc::new(Mutex::new(Inner::default())),
        logic_apps: Arc::new(
            logic_apps
                .iter()
                .map(|(n, l)| (n.to_string(), l.to_string()))
                .collect(),
        ),
    };

    let app = Router::new()
        .route("/:tenant/oauth2/v2.0/token", post(token))
        .route(
            "/subscriptions/:sub/resourceGroups/:rg/providers/Microsoft.Web/sites/:name/:action",
            post(site_action),
        )
        .route("/subscriptions/:sub/resourceGroups/:rg/resources", get(list_resources))
        .route(
            "/subscriptions/:sub/resourceGroups/:rg/providers/Microsoft.Resources/deployments/:name",
            put(put_deployment).get(get_deployment),
        )
        .route("/api/zipdeploy", post(zipdeploy))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock azure listener");
    let host = listener.local_addr().unwrap().to_string();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    MockAzure {
        state,
        shutdown_tx,
        handle,
        base_url: format!("http://{}", host),
        host,
    }
}

async fn record(
    state: &MockState,
    method: &'static str,
    path: String,
    headers: &HeaderMap,
    body: &[u8],
) {
    let get = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.inner.lock().await.requests.push(Recorded {
        method,
        path,
        authorization: get(header::AUTHORIZATION),
        content_type: get(header::CONTENT_TYPE),
        body: body.to_vec(),
    });
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        == Some(MOCK_TOKEN)
}

fn arm_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}

async fn token(Path(_tenant): Path<String>, Form(form): Form<HashMap<String, String>>) -> Response {
    if form.get("grant_type").map(String::as_str) != Some("client_credentials") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        )
            .into_response();
    }
    if form.get("client_secret").map(String::as_str) != Some(MOCK_SECRET) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })),
        )
            .into_response();
    }
    Json(json!({
        "token_type": "Bearer",
        "expires_in": 3599,
        "access_token": MOCK_TOKEN
    }))
    .into_response()
}

async fn site_action(
    State(state): State<MockState>,
    Path((_sub, _rg, name, action)): Path<(String, String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, "POST", format!("sites/{}/{}", name, action), &headers, &body).await;
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match action.as_str() {
        "publishxml" => (
            [(header::CONTENT_TYPE, "application/xml")],
            PUBLISH_XML.replace("func", &name),
        )
            .into_response(),
        "syncfunctiontriggers" => match name.as_str() {
            "quirky" => StatusCode::OK.into_response(),
            "clean" => StatusCode::NO_CONTENT.into_response(),
            _ => arm_error(
                StatusCode::NOT_FOUND,
                "ResourceNotFound",
                &format!("The Resource 'Microsoft.Web/sites/{}' was not found.", name),
            ),
        },
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_resources(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let filter = query.get("$filter").cloned().unwrap_or_default();
    record(&state, "GET", format!("resources?{}", filter), &headers, &[]).await;
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let wanted = filter
        .strip_prefix("name eq '")
        .and_then(|f| f.strip_suffix('\''))
        .unwrap_or_default();
    let value: Vec<Value> = state
        .logic_apps
        .get(wanted)
        .map(|location| {
            json!({
                "id": format!("/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Logic/workflows/{}", wanted),
                "name": wanted,
                "type": "Microsoft.Logic/workflows",
                "location": location
            })
        })
        .into_iter()
        .collect();
    Json(json!({ "value": value })).into_response()
}

async fn put_deployment(
    State(state): State<MockState>,
    Path((_sub, _rg, name)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, "PUT", format!("deployments/{}", name), &headers, &body).await;
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({ "name": name, "properties": { "provisioningState": "Accepted" } })),
    )
        .into_response()
}

async fn get_deployment(
    State(state): State<MockState>,
    Path((_sub, _rg, name)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    record(&state, "GET", format!("deployments/{}", name), &headers, &[]).await;
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let reads = {
        let mut inner = state.inner.lock().await;
        let reads = inner.status_reads.entry(name.clone()).or_insert(0);
        *reads += 1;
        *reads
    };

    let provisioning_state = if reads < 2 {
        "Running"
    } else if name.contains("broken") {
        "Failed"
    } else {
        "Succeeded"
    };
    Json(json!({ "name": name, "properties": { "provisioningState": provisioning_state } }))
        .into_response()
}

async fn zipdeploy(State(state): State<MockState>, headers: HeaderMap, body: Bytes) -> Response {
    record(&state, "POST", "api/zipdeploy".to_string(), &headers, &body).await;

    let reject = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Basic {}", base64_user("$reject", "pw")))
        .unwrap_or(false);
    if reject {
        return (StatusCode::CONFLICT, "Conflict: a deployment is already running").into_response();
    }
    StatusCode::OK.into_response()
}

fn base64_user(user: &str, password: &str) -> String {
    azure_deploy::deploy::basic_auth_header(user, password)
        .trim_start_matches("Basic ")
        .to_string()
}
