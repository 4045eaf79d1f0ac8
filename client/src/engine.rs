//! HTTP handle to the remote engine.
//!
//! The engine exposes exactly two operations, both JSON POSTs sharing
//! one response shape. Rejections come back as 4xx with an `error`
//! body, which decodes like any other response; only transport and
//! decode failures surface as `Err`. Nothing is retried: every failure
//! requires a fresh user-initiated action.

use railbird_types::{ActionRequest, EngineResponse, PlayerActionRequest, StartHandRequest};
use serde::Serialize;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::{Error, Result};

/// One engine handle per session. The session id is minted at
/// construction and sent with every request.
#[derive(Clone, Debug)]
pub struct Engine {
    http: reqwest::Client,
    base_url: Url,
    session_id: String,
}

impl Engine {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            other => return Err(Error::InvalidScheme(other.to_string())),
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            session_id: Uuid::new_v4().to_string(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Asks the engine to deal a new hand for this session.
    pub async fn start_hand(&self) -> Result<EngineResponse> {
        let url = self.base_url.join("api/new_hand")?;
        let body = StartHandRequest {
            session_id: &self.session_id,
        };
        self.post(url, &body).await
    }

    /// Submits a validated player decision. Validation failures are
    /// returned before any request is issued.
    pub async fn player_action(&self, request: &ActionRequest) -> Result<EngineResponse> {
        request.validate()?;
        let url = self.base_url.join("api/player_action")?;
        let body = PlayerActionRequest {
            session_id: &self.session_id,
            action: request.action,
            raise_amount: request.raise_amount,
        };
        self.post(url, &body).await
    }

    async fn post<B: Serialize>(&self, url: Url, body: &B) -> Result<EngineResponse> {
        debug!(%url, "engine request");
        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str::<EngineResponse>(&text) {
            Ok(decoded) => {
                debug!(%status, result = ?decoded.result, rejected = decoded.error.is_some(), "engine response");
                Ok(decoded)
            }
            Err(_) if !status.is_success() => Err(Error::FailedWithBody { status, body: text }),
            Err(err) => Err(Error::Decode(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use railbird_types::HandResult;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    /// Serves a canned pair of endpoints and records request bodies.
    async fn serve(router: Router) -> (String, tokio::task::JoinHandle<()>) {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            axum::serve(listener, router.into_make_service())
                .await
                .unwrap();
        });
        (base_url, handle)
    }

    #[test]
    fn rejects_non_http_schemes() {
        let err = Engine::new("ftp://example.com").unwrap_err();
        assert!(matches!(err, Error::InvalidScheme(_)));
        assert_eq!(
            err.to_string(),
            "invalid URL scheme: ftp (expected http or https)"
        );

        assert!(Engine::new("http://localhost:5000").is_ok());
        assert!(Engine::new("https://localhost:5000").is_ok());
    }

    #[tokio::test]
    async fn start_hand_posts_the_session_id() {
        let seen = Arc::new(Mutex::new(Vec::<serde_json::Value>::new()));
        let router = Router::new()
            .route(
                "/api/new_hand",
                post(
                    |State(seen): State<Arc<Mutex<Vec<serde_json::Value>>>>,
                     Json(body): Json<serde_json::Value>| async move {
                        seen.lock().unwrap().push(body);
                        Json(serde_json::json!({
                            "log": ["=== Nueva mano ==="],
                            "pot": 30,
                            "player_chips": 990,
                            "bot_chips": 980,
                            "player_hole": ["AH", "9D"],
                            "dealer": "player",
                            "to_act": "player",
                            "street_index": 0,
                        }))
                    },
                ),
            )
            .with_state(seen.clone());

        let (base_url, handle) = serve(router).await;
        let engine = Engine::new(&base_url).unwrap();
        let response = engine.start_hand().await.unwrap();

        assert_eq!(response.pot, Some(30));
        assert_eq!(response.result, HandResult::Continuing);
        let recorded = seen.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(
            recorded[0]["session_id"].as_str(),
            Some(engine.session_id())
        );
        handle.abort();
    }

    #[tokio::test]
    async fn rejection_bodies_decode_even_on_4xx() {
        let router = Router::new().route(
            "/api/player_action",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({ "error": "Sesión no encontrada" })),
                )
            }),
        );

        let (base_url, handle) = serve(router).await;
        let engine = Engine::new(&base_url).unwrap();
        let response = engine.player_action(&ActionRequest::call()).await.unwrap();
        assert_eq!(response.error.as_deref(), Some("Sesión no encontrada"));
        handle.abort();
    }

    #[tokio::test]
    async fn non_json_failures_carry_status_and_body() {
        let router = Router::new().route(
            "/api/player_action",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );

        let (base_url, handle) = serve(router).await;
        let engine = Engine::new(&base_url).unwrap();
        let err = engine
            .player_action(&ActionRequest::fold())
            .await
            .unwrap_err();
        let Error::FailedWithBody { status, body } = err else {
            panic!("expected FailedWithBody, got {err:?}");
        };
        assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "boom");
        handle.abort();
    }

    #[tokio::test]
    async fn invalid_raises_never_reach_the_network() {
        // No server at all: validation must fail first.
        let engine = Engine::new("http://127.0.0.1:1").unwrap();
        let request = ActionRequest {
            action: railbird_types::PlayerAction::Raise,
            raise_amount: None,
        };
        let err = engine.player_action(&request).await.unwrap_err();
        assert!(matches!(err, Error::Action(_)));
    }

    #[tokio::test]
    async fn transport_failures_are_connectivity_errors() {
        // Nothing listens on this port.
        let engine = Engine::new("http://127.0.0.1:1").unwrap();
        let err = engine.start_hand().await.unwrap_err();
        assert!(err.is_connectivity());
    }
}
