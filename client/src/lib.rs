//! SDK for driving a heads-up hand against a remote poker engine: the
//! HTTP handle to the engine, the result-dispatching controller, the
//! turn gate, and the session scoreboard.

pub mod controller;
pub mod engine;
pub mod gate;
pub mod score;

pub use controller::{ControllerConfig, Directive, GateDirective, HandController};
pub use engine::Engine;
pub use gate::{PacingToken, TurnGate};
pub use score::{ScoreBoard, ScoreEvent};

use thiserror::Error;

/// Error type for client operations.
///
/// The three user-visible failure families stay distinct: local
/// validation ([`Error::Action`]), transport failures
/// ([`Error::Reqwest`]), and malformed or non-JSON engine replies
/// ([`Error::Decode`], [`Error::FailedWithBody`]). An engine reply that
/// carries an `error` field is not an `Err` at all; it surfaces as a
/// rejected [`Directive`](controller::Directive).
#[derive(Error, Debug)]
pub enum Error {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("failed: {status}: {body}")]
    FailedWithBody {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid action: {0}")]
    Action(#[from] railbird_types::ActionError),
    #[error("action surface is not open")]
    GateClosed,
    #[error("no hand in progress")]
    NoHand,
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
}

impl Error {
    /// Whether the failure means the request never took effect remotely
    /// (so the player's turn can be restored without state drift).
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Reqwest(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use railbird_types::{ActionRequest, HandResult, Seat};
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted engine: a fixed start response plus one action response
    /// per submission, in order.
    async fn scripted_engine(
        start: serde_json::Value,
        actions: Vec<serde_json::Value>,
    ) -> (String, tokio::task::JoinHandle<()>) {
        let step = Arc::new(AtomicUsize::new(0));
        let actions = Arc::new(actions);
        let router = Router::new()
            .route(
                "/api/new_hand",
                post({
                    let start = start.clone();
                    move || async move { Json(start) }
                }),
            )
            .route(
                "/api/player_action",
                post(
                    |State((step, actions)): State<(
                        Arc<AtomicUsize>,
                        Arc<Vec<serde_json::Value>>,
                    )>| async move {
                        let index = step.fetch_add(1, Ordering::SeqCst);
                        match actions.get(index) {
                            Some(response) => (StatusCode::OK, Json(response.clone())),
                            None => (
                                StatusCode::BAD_REQUEST,
                                Json(serde_json::json!({ "error": "Acción inválida" })),
                            ),
                        }
                    },
                ),
            )
            .with_state((step, actions));

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

    fn start_response() -> serde_json::Value {
        serde_json::json!({
            "log": ["Dealer: Jugador -> SB=10, Bot -> BB=20", "=== Nueva mano ==="],
            "pot": 30,
            "player_chips": 990,
            "bot_chips": 980,
            "player_hole": ["AH", "9D"],
            "dealer": "player",
            "to_act": "player",
            "street_index": 0,
        })
    }

    #[tokio::test]
    async fn a_full_hand_runs_from_deal_to_showdown() {
        let (base_url, server) = scripted_engine(
            start_response(),
            vec![
                // Call of the big blind closes the round: flop.
                serde_json::json!({
                    "result": "new_street",
                    "log": ["Player hace CALL de 10 fichas.", "Ronda de apuestas completada.", "Flop: ['5H', 'TD', '2C']"],
                    "pot": 40,
                    "community": ["5H", "TD", "2C"],
                    "street_index": 1,
                    "to_act": "bot",
                }),
                // Check-check: turn.
                serde_json::json!({
                    "result": "new_street",
                    "log": ["Player hace CHECK.", "Bot hace CHECK.", "Turn: JH"],
                    "community": ["5H", "TD", "2C", "JH"],
                    "street_index": 2,
                    "to_act": "bot",
                }),
                // Check-check: river.
                serde_json::json!({
                    "result": "new_street",
                    "log": ["Player hace CHECK.", "Bot hace CHECK.", "River: 3S"],
                    "community": ["5H", "TD", "2C", "JH", "3S"],
                    "street_index": 3,
                    "to_act": "bot",
                }),
                // Final check-check: showdown.
                serde_json::json!({
                    "result": "showdown",
                    "log": [
                        "Player hace CHECK.",
                        "Bot hace CHECK.",
                        "Showdown!",
                        "Tu mejor jugada: Par de Ases",
                        "Mejor jugada del bot: Carta alta",
                        "¡Ganas la mano y te llevas el MAIN POT de 40 fichas!",
                    ],
                    "pot": 40,
                    "player_chips": 1010,
                    "bot_chips": 980,
                    "bot_hole": ["KC", "2H"],
                    "dealer": "player",
                }),
            ],
        )
        .await;

        let engine = Engine::new(&base_url).unwrap();
        let mut controller = HandController::new(ControllerConfig::default());

        let started = engine.start_hand().await.unwrap();
        let directive = controller.start_hand(&started).unwrap();
        assert_eq!(directive.gate, GateDirective::Open(Seat::Player));

        let mut streets_seen = Vec::new();
        loop {
            assert!(controller.player_may_act());
            controller
                .begin_submission(&ActionRequest::call())
                .unwrap();
            let response = engine.player_action(&ActionRequest::call()).await.unwrap();
            let directive = controller.apply(&response).unwrap();
            streets_seen.push(controller.snapshot().unwrap().street_index);

            if directive.terminal {
                break;
            }
            let GateDirective::OpenDelayed(token) = directive.gate else {
                panic!("expected a paced reopen, got {:?}", directive.gate);
            };
            assert!(controller.fire_gate(token));
        }

        // Streets only ever moved forward.
        assert!(streets_seen.windows(2).all(|pair| pair[0] <= pair[1]));

        let snapshot = controller.snapshot().unwrap();
        assert!(snapshot.hand_ended);
        assert_eq!(snapshot.to_act, None);
        assert_eq!(snapshot.result, HandResult::Showdown);
        assert_eq!(snapshot.community_cards.len(), 5);
        assert_eq!(snapshot.bot_hole.as_ref().map(Vec::len), Some(2));
        assert_eq!(snapshot.player_chips, 1010);

        let messages = controller.messages();
        assert_eq!(messages.showdown_banner.as_deref(), Some("Showdown!"));
        assert_eq!(
            messages.winner.as_deref(),
            Some("¡Ganas la mano y te llevas el MAIN POT de 40 fichas!")
        );

        // Neither stack reached zero, so no win is recorded.
        assert_eq!(controller.score().hands_played, 1);
        assert_eq!(controller.score().player_wins, 0);
        assert_eq!(controller.score().bot_wins, 0);

        server.abort();
    }

    #[tokio::test]
    async fn a_rejected_action_leaves_state_alone_and_restores_the_turn() {
        // No scripted action responses: every submission is rejected.
        let (base_url, server) = scripted_engine(start_response(), vec![]).await;

        let engine = Engine::new(&base_url).unwrap();
        let mut controller = HandController::new(ControllerConfig::default());
        let started = engine.start_hand().await.unwrap();
        controller.start_hand(&started).unwrap();
        let before = controller.snapshot().unwrap().clone();

        controller
            .begin_submission(&ActionRequest::call())
            .unwrap();
        let response = engine.player_action(&ActionRequest::call()).await.unwrap();
        let directive = controller.apply(&response).unwrap();

        assert_eq!(directive.engine_error.as_deref(), Some("Acción inválida"));
        assert_eq!(controller.snapshot().unwrap(), &before);
        assert!(controller.player_may_act());

        server.abort();
    }
}
