//! In-process mock of the Zoho accounts and Projects API servers.
//!
//! The API accepts exactly one token (`valid_token`) and answers 401 to anything else.
//! The token endpoint behaves according to `TokenMode`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Form, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Clone, Debug)]
pub enum TokenMode {
    /// Issue this token with the given lifetime.
    Issue(String, i64),
    /// Answer 400 like Zoho does for a revoked refresh token.
    Reject,
    /// Answer 200 with an `error` field and no token.
    ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Debug)]
pub struct MockState {
    pub valid_token: Mutex<String>,
    pub token_mode: Mutex<TokenMode>,
    pub token_calls: AtomicUsize,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub api_requests: Mutex<Vec<RecordedRequest>>,
}

#[derive(Clone, Debug)]
pub struct MockZoho {
    pub state: Arc<MockState>,
    pub base_url: String,
}

impl MockZoho {
    /// Start a mock on an ephemeral port.
    pub async fn start(valid_token: &str, token_mode: TokenMode) -> Self {
        let state = Arc::new(MockState {
            valid_token: Mutex::new(valid_token.to_string()),
            token_mode: Mutex::new(token_mode),
            token_calls: AtomicUsize::new(0),
            token_forms: Mutex::new(Vec::new()),
            api_requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/oauth/v2/token", post(token))
            .fallback(api)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to read mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock server failed");
        });

        Self {
            state,
            base_url: format!("http://{}", addr),
        }
    }

    pub fn token_calls(&self) -> usize {
        self.state.token_calls.load(Ordering::SeqCst)
    }

    pub fn api_calls(&self) -> usize {
        self.state.api_requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.api_requests.lock().unwrap().clone()
    }

    pub fn authorizations(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.authorization.unwrap_or_default())
            .collect()
    }

    pub fn token_forms(&self) -> Vec<HashMap<String, String>> {
        self.state.token_forms.lock().unwrap().clone()
    }
}

async fn token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_calls.fetch_add(1, Ordering::SeqCst);
    state.token_forms.lock().unwrap().push(form);

    let mode = state.token_mode.lock().unwrap().clone();
    match mode {
        TokenMode::Issue(token, expires_in) => Json(json!({
            "access_token": token,
            "api_domain": "https://www.zohoapis.com",
            "token_type": "Bearer",
            "expires_in": expires_in
        }))
        .into_response(),
        TokenMode::Reject => {
            (StatusCode::BAD_REQUEST, r#"{"error":"invalid_client"}"#).into_response()
        }
        TokenMode::ErrorBody => Json(json!({ "error": "invalid_code" })).into_response(),
    }
}

async fn api(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let body = String::from_utf8_lossy(&body).to_string();
    state.api_requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(|q| q.to_string()),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    let expected = format!("Zoho-oauthtoken {}", state.valid_token.lock().unwrap());
    if authorization.as_deref() != Some(expected.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "code": 6401, "title": "INVALID_OAUTHTOKEN" } })),
        )
            .into_response();
    }

    let path = uri.path();
    if path.ends_with("/viewInlineImage") {
        return ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES).into_response();
    }
    if path.ends_with("/notes.txt") {
        return ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "release notes")
            .into_response();
    }
    if path.ends_with("/not-json") {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    if path.ends_with("/missing") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "title": "URL_NOT_FOUND" } })),
        )
            .into_response();
    }

    match method {
        Method::DELETE => StatusCode::NO_CONTENT.into_response(),
        Method::POST | Method::PATCH | Method::PUT => {
            let echoed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            Json(json!({ "received": echoed })).into_response()
        }
        _ => Json(json!({
            "projects": [
                {
                    "id": "1001",
                    "name": "Website Relaunch",
                    "status": "active",
                    "description": "<p>long html</p>",
                    "layout": { "id": "9", "name": "Standard" }
                }
            ],
            "page_info": { "page": 1, "per_page": 10, "has_next_page": false }
        }))
        .into_response(),
    }
}
