//! HTTP chat transport for Folio.
//!
//! Exposes the persona over a small JSON API:
//!
//! - `GET  /health`                 : liveness
//! - `GET  /v1/persona`             : name, description and example prompts
//! - `POST /v1/chat`                : stateless: the caller sends the history
//! - `POST /v1/sessions/{id}/chat`  : the server keeps the history
//! - `GET  /v1/sessions/{id}`       : a session's visible history
//!
//! A model backend failure is never an HTTP error: the visitor gets the
//! fixed apology with status 200.
//!
//! Built on Axum for high performance async HTTP.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use folio_agent::{AgentLoop, TurnStatus};
use folio_config::AppConfig;
use folio_core::message::{Conversation, ConversationId, Message};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Maximum accepted request body.
const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Longest accepted session id.
const MAX_SESSION_ID_LEN: usize = 128;

/// What chat front-ends show about the persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaInfo {
    pub name: String,
    pub description: String,
    pub examples: Vec<String>,
}

impl PersonaInfo {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            name: config.persona.name.clone(),
            description: config.persona.description.clone(),
            examples: config.persona.examples.clone(),
        }
    }
}

struct Session {
    created_at: DateTime<Utc>,
    conversation: Arc<Mutex<Conversation>>,
}

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: Arc<AgentLoop>,
    pub persona: PersonaInfo,
    max_sessions: usize,
    sessions: RwLock<HashMap<String, Session>>,
}

impl GatewayState {
    pub fn new(agent: Arc<AgentLoop>, persona: PersonaInfo, max_sessions: usize) -> Self {
        Self {
            agent,
            persona,
            max_sessions: max_sessions.max(1),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get a session's conversation, creating it (and evicting the oldest
    /// session when full) if it does not exist.
    async fn session(&self, id: &str) -> Arc<Mutex<Conversation>> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return session.conversation.clone();
        }

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions && !sessions.contains_key(id) {
            if let Some(oldest_key) = sessions
                .iter()
                .min_by_key(|(_, s)| s.created_at)
                .map(|(k, _)| k.clone())
            {
                debug!(session_id = %oldest_key, "Evicting oldest session");
                sessions.remove(&oldest_key);
            }
        }

        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                let mut conversation = Conversation::new();
                conversation.id = ConversationId::from(id);
                Session {
                    created_at: Utc::now(),
                    conversation: Arc::new(Mutex::new(conversation)),
                }
            })
            .conversation
            .clone()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/persona", get(persona_handler))
        .route("/v1/chat", post(chat_handler))
        .route("/v1/sessions/{id}/chat", post(session_chat_handler))
        .route("/v1/sessions/{id}", get(session_history_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Gateway startup errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start the gateway HTTP server.
pub async fn start(config: &AppConfig, agent: Arc<AgentLoop>) -> Result<(), GatewayError> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(GatewayState::new(
        agent,
        PersonaInfo::from_config(config),
        config.gateway.max_sessions,
    ));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| GatewayError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(addr = %addr, persona = %config.persona.name, "Gateway listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn persona_handler(State(state): State<SharedState>) -> Json<PersonaInfo> {
    Json(state.persona.clone())
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn validate_message(message: &str) -> Result<(), ApiError> {
    if message.trim().is_empty() {
        return Err(bad_request("message must not be empty"));
    }
    Ok(())
}

fn validate_session_id(id: &str) -> Result<(), ApiError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(bad_request(
            "session id must be 1-128 characters of letters, digits, '-' or '_'",
        ));
    }
    Ok(())
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<Message>,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    history: Vec<Message>,
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    validate_message(&payload.message)?;
    debug!(history = payload.history.len(), "v1/chat request");

    let (outcome, history) = state.agent.respond(&payload.message, payload.history).await;

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        history,
    }))
}

#[derive(Deserialize)]
struct SessionChatRequest {
    message: String,
}

#[derive(Serialize)]
struct SessionChatResponse {
    session_id: String,
    reply: String,
}

async fn session_chat_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<SessionChatRequest>,
) -> Result<Json<SessionChatResponse>, ApiError> {
    validate_session_id(&id)?;
    validate_message(&payload.message)?;

    // Messages within one session are handled one at a time.
    let session = state.session(&id).await;
    let mut conversation = session.lock().await;

    let prior_len = conversation.len();
    conversation.push(Message::user(&payload.message));
    let outcome = state.agent.run_turn(&mut conversation).await;
    if outcome.status == TurnStatus::BackendFailure {
        conversation.truncate(prior_len);
    }

    Ok(Json(SessionChatResponse {
        session_id: id,
        reply: outcome.reply,
    }))
}

#[derive(Serialize)]
struct SessionHistoryResponse {
    session_id: String,
    messages: Vec<Message>,
}

async fn session_history_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionHistoryResponse>, ApiError> {
    validate_session_id(&id)?;

    let conversation = {
        let sessions = state.sessions.read().await;
        sessions.get(&id).map(|s| s.conversation.clone())
    };
    let Some(conversation) = conversation else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("session '{id}' not found"),
            }),
        ));
    };

    let messages = conversation.lock().await.visible_messages();
    Ok(Json(SessionHistoryResponse {
        session_id: id,
        messages,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use folio_agent::BACKEND_FAILURE_REPLY;
    use folio_core::error::ProviderError;
    use folio_core::event::EventBus;
    use folio_core::knowledge::KnowledgeBase;
    use folio_core::persona::Persona;
    use folio_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use folio_core::tool::ToolRegistry;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Answers every request with how many user messages it saw.
    struct CountingProvider;

    #[async_trait]
    impl Provider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            let users = request
                .messages
                .iter()
                .filter(|m| m.role == folio_core::message::Role::User)
                .count();
            Ok(ProviderResponse {
                message: Message::assistant(format!("seen {users}")),
                usage: None,
                model: "mock-model".into(),
            })
        }
    }

    struct DownProvider;

    #[async_trait]
    impl Provider for DownProvider {
        fn name(&self) -> &str {
            "down"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::Network("connection refused".into()))
        }
    }

    fn test_state(provider: Arc<dyn Provider>, max_sessions: usize) -> SharedState {
        let persona = Arc::new(Persona::new("Ada", &KnowledgeBase::from_text("Profile", "Summary")));
        let agent = Arc::new(AgentLoop::new(
            provider,
            "mock-model",
            0.7,
            Arc::new(ToolRegistry::new()),
            persona,
            Arc::new(EventBus::default()),
        ));
        Arc::new(GatewayState::new(
            agent,
            PersonaInfo {
                name: "Ada".into(),
                description: "Ask me about my work".into(),
                examples: vec!["What do you do?".into()],
            },
            max_sessions,
        ))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(Arc::new(CountingProvider), 10));
        let response = app.oneshot(get_req("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn persona_endpoint() {
        let app = build_router(test_state(Arc::new(CountingProvider), 10));
        let response = app.oneshot(get_req("/v1/persona")).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["examples"][0], "What do you do?");
    }

    #[tokio::test]
    async fn stateless_chat_returns_updated_history() {
        let app = build_router(test_state(Arc::new(CountingProvider), 10));
        let response = app
            .oneshot(post_json(
                "/v1/chat",
                serde_json::json!({
                    "message": "And now?",
                    "history": [
                        {"role": "system", "content": "You are a pirate."},
                        {"role": "user", "content": "Hi"},
                        {"role": "assistant", "content": "Hello!"}
                    ]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["reply"], "seen 2");
        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 4);
        assert!(history.iter().all(|m| m["role"] != "system"));
    }

    #[tokio::test]
    async fn stateless_chat_drops_malformed_history() {
        let app = build_router(test_state(Arc::new(CountingProvider), 10));
        let response = app
            .oneshot(post_json(
                "/v1/chat",
                serde_json::json!({
                    "message": "hi",
                    "history": [
                        {"role": "tool", "content": "{\"ok\":true}"},
                        {"role": "assistant", "content": null}
                    ]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["reply"], "seen 1");
        let roles: Vec<&str> = body["history"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|m| m["role"].as_str())
            .collect();
        assert_eq!(roles, vec!["user", "assistant"]);
    }

    #[tokio::test]
    async fn backend_failure_is_200_with_apology() {
        let app = build_router(test_state(Arc::new(DownProvider), 10));
        let response = app
            .oneshot(post_json(
                "/v1/chat",
                serde_json::json!({
                    "message": "Hello?",
                    "history": [{"role": "user", "content": "Hi"}, {"role": "assistant", "content": "Hey"}]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["reply"], BACKEND_FAILURE_REPLY);
        assert_eq!(body["history"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_message_rejected() {
        let app = build_router(test_state(Arc::new(CountingProvider), 10));
        let response = app
            .oneshot(post_json("/v1/chat", serde_json::json!({"message": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let app = build_router(test_state(Arc::new(CountingProvider), 10));
        let message = "x".repeat(BODY_LIMIT_BYTES + 1);
        let response = app
            .oneshot(post_json("/v1/chat", serde_json::json!({"message": message})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn session_keeps_history_between_messages() {
        let app = build_router(test_state(Arc::new(CountingProvider), 10));

        let first = app
            .clone()
            .oneshot(post_json("/v1/sessions/visitor-1/chat", serde_json::json!({"message": "Hi"})))
            .await
            .unwrap();
        assert_eq!(json_body(first).await["reply"], "seen 1");

        let second = app
            .clone()
            .oneshot(post_json("/v1/sessions/visitor-1/chat", serde_json::json!({"message": "Again"})))
            .await
            .unwrap();
        let body = json_body(second).await;
        assert_eq!(body["session_id"], "visitor-1");
        assert_eq!(body["reply"], "seen 2");

        let history = app.oneshot(get_req("/v1/sessions/visitor-1")).await.unwrap();
        let body = json_body(history).await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let app = build_router(test_state(Arc::new(CountingProvider), 10));
        app.clone()
            .oneshot(post_json("/v1/sessions/a/chat", serde_json::json!({"message": "Hi"})))
            .await
            .unwrap();
        let response = app
            .oneshot(post_json("/v1/sessions/b/chat", serde_json::json!({"message": "Hi"})))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["reply"], "seen 1");
    }

    #[tokio::test]
    async fn session_backend_failure_keeps_history_unchanged() {
        let app = build_router(test_state(Arc::new(DownProvider), 10));
        let response = app
            .clone()
            .oneshot(post_json("/v1/sessions/s1/chat", serde_json::json!({"message": "Hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["reply"], BACKEND_FAILURE_REPLY);

        let history = app.oneshot(get_req("/v1/sessions/s1")).await.unwrap();
        assert!(json_body(history).await["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let app = build_router(test_state(Arc::new(CountingProvider), 10));
        let response = app.oneshot(get_req("/v1/sessions/nobody")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_session_id_rejected() {
        let app = build_router(test_state(Arc::new(CountingProvider), 10));
        let response = app
            .oneshot(post_json("/v1/sessions/bad.id/chat", serde_json::json!({"message": "Hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oldest_session_evicted_at_capacity() {
        let state = test_state(Arc::new(CountingProvider), 2);
        state.session("first").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        state.session("second").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        state.session("third").await;

        assert_eq!(state.session_count().await, 2);
        let sessions = state.sessions.read().await;
        assert!(!sessions.contains_key("first"));
        assert!(sessions.contains_key("third"));
    }
}
