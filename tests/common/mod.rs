// Shared test harness: a scripted in-process stand-in for the legacy
// HTNS server, plus a spawner for the bridge app itself. Each test gets
// its own server on a free port and its own call log.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{AppendHeaders, Html, IntoResponse, Json, Response};
use axum::routing::{any, get, post};
use axum::Router;
use serde_json::{json, Value};

use htns_auth_bridge::config::{AppConfig, Environment, LegacyConfig, ServerConfig};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("htns_auth_bridge=debug,tower_http=info")
            .try_init();
    });
}

/// Scripted behavior for one mock legacy server instance.
#[derive(Clone)]
pub struct Scenario {
    /// CSRF token rendered into the unauthenticated login page; None
    /// renders a page without the hidden field.
    pub login_page_csrf: Option<String>,
    /// Delay before the login page answers, for exercising timeouts.
    pub login_page_delay_ms: u64,
    /// Whether the credential POST answers 302 (true) or a 200 error page.
    pub accept_credentials: bool,
    /// Session ids are handed out as "{base}-{n}" per accepted login.
    pub session_base: String,
    /// X-CSRF-TOKEN Set-Cookie on the post-auth login page fetch.
    pub refresh_header_token: Option<String>,
    /// CSRF token rendered into the post-auth login page body.
    pub refresh_page_csrf: Option<String>,
    pub get_init: MockAnswer,
    pub get_init_new_portal: MockAnswer,
    pub user_session: MockAnswer,
}

#[derive(Clone)]
pub enum MockAnswer {
    Json(Value),
    /// 200 with text/html, the legacy server's silent login redirect.
    HtmlPage,
    /// 200 with JSON content type but an unparseable body.
    InvalidJson,
    NotFound,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            login_page_csrf: Some("csrf-initial".to_string()),
            login_page_delay_ms: 0,
            accept_credentials: true,
            session_base: "legacy-session".to_string(),
            refresh_header_token: Some("csrf-refreshed".to_string()),
            refresh_page_csrf: None,
            get_init: MockAnswer::Json(default_profile()),
            get_init_new_portal: MockAnswer::NotFound,
            user_session: MockAnswer::NotFound,
        }
    }
}

pub fn default_profile() -> Value {
    json!({
        "USER_NM": "Jane Admin",
        "EMAIL": "jane.admin@corp.example",
        "EMP_NO": "E-1001",
        "MENU_LIST": [{"menuId": "DASH"}],
        "AUTH_LIST": ["admin", "user"]
    })
}

#[derive(Debug, Clone)]
pub struct CallRecord {
    pub method: String,
    pub path: String,
    pub body: String,
    pub cookie: Option<String>,
    pub csrf_header: Option<String>,
}

#[derive(Clone)]
struct MockState {
    scenario: Arc<Scenario>,
    calls: Arc<Mutex<Vec<CallRecord>>>,
    logins: Arc<AtomicUsize>,
}

pub struct MockLegacy {
    pub base_url: String,
    calls: Arc<Mutex<Vec<CallRecord>>>,
}

impl MockLegacy {
    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// Only the step-4 / proxied API calls.
    pub fn api_calls(&self) -> Vec<CallRecord> {
        self.calls()
            .into_iter()
            .filter(|call| call.path.starts_with("/api/"))
            .collect()
    }

    pub fn legacy_config(&self) -> LegacyConfig {
        LegacyConfig {
            base_url: self.base_url.clone(),
            login_page_path: "/login.jsp".to_string(),
            auth_path: "/htns_sec".to_string(),
            email_domain: "htns.com".to_string(),
            request_timeout_secs: 5,
            overall_deadline_secs: 15,
        }
    }
}

pub async fn spawn_mock_legacy(scenario: Scenario) -> Result<MockLegacy> {
    init_tracing();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        scenario: Arc::new(scenario),
        calls: calls.clone(),
        logins: Arc::new(AtomicUsize::new(0)),
    };

    let router = Router::new()
        .route("/login.jsp", get(login_page))
        .route("/htns_sec", post(authenticate))
        .route("/api/G1E000000SVC/getInit", post(get_init))
        .route("/api/G1E000000SVC/getInitNewPortal", post(get_init_new_portal))
        .route("/api/user/session", get(user_session))
        .route("/api/ping", any(ping))
        .with_state(state);

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind mock legacy server")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(MockLegacy {
        base_url: format!("http://127.0.0.1:{}", port),
        calls,
    })
}

/// Spawn the bridge app pointed at the given legacy server.
pub async fn spawn_app(legacy: LegacyConfig) -> Result<String> {
    init_tracing();

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let config = AppConfig {
        environment: Environment::Development,
        server: ServerConfig { port },
        legacy,
    };
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind bridge app")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, htns_auth_bridge::app(config)).await;
    });

    Ok(format!("http://127.0.0.1:{}", port))
}

fn record(state: &MockState, method: &str, path: &str, headers: &HeaderMap, body: String) {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let csrf_header = headers
        .get("x-csrf-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.calls.lock().expect("call log poisoned").push(CallRecord {
        method: method.to_string(),
        path: path.to_string(),
        body,
        cookie,
        csrf_header,
    });
}

fn login_html(csrf: Option<&str>) -> String {
    match csrf {
        Some(token) => format!(
            r#"<html><body><form action="/htns_sec" method="post"><input type="hidden" name="_csrf" value="{}"/></form></body></html>"#,
            token
        ),
        None => "<html><body><h1>Service notice</h1></body></html>".to_string(),
    }
}

async fn login_page(State(state): State<MockState>, headers: HeaderMap) -> Response {
    record(&state, "GET", "/login.jsp", &headers, String::new());

    if state.scenario.login_page_delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(state.scenario.login_page_delay_ms)).await;
    }

    let authenticated = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|cookie| cookie.contains("JSESSIONID="))
        .unwrap_or(false);

    if authenticated {
        // Post-auth refresh fetch (step 3 of the pipeline)
        let body = login_html(state.scenario.refresh_page_csrf.as_deref());
        if let Some(token) = &state.scenario.refresh_header_token {
            return (
                AppendHeaders([(header::SET_COOKIE, format!("X-CSRF-TOKEN={}; Path=/", token))]),
                Html(body),
            )
                .into_response();
        }
        Html(body).into_response()
    } else {
        let body = login_html(state.scenario.login_page_csrf.as_deref());
        (
            AppendHeaders([(
                header::SET_COOKIE,
                "JSESSIONID=preauth-cookie; Path=/; HttpOnly".to_string(),
            )]),
            Html(body),
        )
            .into_response()
    }
}

async fn authenticate(State(state): State<MockState>, headers: HeaderMap, body: String) -> Response {
    record(&state, "POST", "/htns_sec", &headers, body);

    if state.scenario.accept_credentials {
        let n = state.logins.fetch_add(1, Ordering::SeqCst) + 1;
        let session_id = format!("{}-{}", state.scenario.session_base, n);
        (
            StatusCode::FOUND,
            AppendHeaders([
                (header::SET_COOKIE, format!("JSESSIONID={}; Path=/; HttpOnly", session_id)),
                (header::LOCATION, "/main.do".to_string()),
            ]),
        )
            .into_response()
    } else {
        // The legacy server renders its error page with HTTP 200
        Html(login_html(state.scenario.login_page_csrf.as_deref())).into_response()
    }
}

fn answer(answer: &MockAnswer) -> Response {
    match answer {
        MockAnswer::Json(value) => Json(value.clone()).into_response(),
        MockAnswer::HtmlPage => Html(
            "<html><body><script>location.href='/login.jsp'</script></body></html>".to_string(),
        )
        .into_response(),
        MockAnswer::InvalidJson => (
            [(header::CONTENT_TYPE, "application/json")],
            "this is not json",
        )
            .into_response(),
        MockAnswer::NotFound => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_init(State(state): State<MockState>, headers: HeaderMap, body: String) -> Response {
    record(&state, "POST", "/api/G1E000000SVC/getInit", &headers, body);
    answer(&state.scenario.get_init)
}

async fn get_init_new_portal(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    record(&state, "POST", "/api/G1E000000SVC/getInitNewPortal", &headers, body);
    answer(&state.scenario.get_init_new_portal)
}

async fn user_session(State(state): State<MockState>, headers: HeaderMap) -> Response {
    record(&state, "GET", "/api/user/session", &headers, String::new());
    answer(&state.scenario.user_session)
}

async fn ping(
    State(state): State<MockState>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    record(&state, method.as_str(), "/api/ping", &headers, body);
    Json(json!({ "pong": true }))
}
