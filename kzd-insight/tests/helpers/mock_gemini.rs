//! In-process stand-in for the Gemini generateContent endpoint
//!
//! Each model gets a queue of scripted (status, body) replies. A model with an
//! empty queue answers 404 like an unknown model.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const INSIGHT_JSON: &str = r#"{
  "mainInsight": "Your shoulders are carrying the day's meetings.",
  "microActions": [
    {"id": 1, "text": "Physiological Sigh (1 min)", "instruction": "Two short inhales, long exhale.", "icon": "breath"},
    {"id": 2, "text": "Unclench Check (30 sec)", "instruction": "Relax jaw, shoulders, hands.", "icon": "stretch"}
  ],
  "upliftingQuote": "Almost everything will work again if you unplug it for a few minutes. - Anne Lamott"
}"#;

/// A successful generateContent body whose first part is `text`
pub fn candidate_reply(text: &str) -> String {
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
    .to_string()
}

pub fn error_reply(code: u16, message: &str) -> String {
    json!({ "error": { "code": code, "message": message, "status": "ERROR" } }).to_string()
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub api_key: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Default)]
struct MockState {
    scripts: Mutex<HashMap<String, VecDeque<(u16, String)>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

pub struct MockGemini {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockGemini {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/models/:call", post(generate_content))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/models", addr),
            state,
        }
    }

    /// Queue a reply for the next call to `model`
    pub fn push(&self, model: &str, status: u16, body: String) -> &Self {
        self.state
            .scripts
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push_back((status, body));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, model: &str) -> usize {
        self.calls().iter().filter(|c| c.model == model).count()
    }
}

async fn generate_content(
    State(state): State<Arc<MockState>>,
    Path(call): Path<String>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let model = call.trim_end_matches(":generateContent").to_string();

    state.calls.lock().unwrap().push(RecordedCall {
        model: model.clone(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
    });

    let next = state
        .scripts
        .lock()
        .unwrap()
        .get_mut(&model)
        .and_then(|queue| queue.pop_front());

    match next {
        Some((status, body)) => (StatusCode::from_u16(status).unwrap(), body),
        None => (
            StatusCode::NOT_FOUND,
            error_reply(404, &format!("models/{} is not found", model)),
        ),
    }
}
