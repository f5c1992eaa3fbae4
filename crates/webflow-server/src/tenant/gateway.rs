//! Public upgrade route for the multi-tenant host.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use metrics::counter;
use serde::Deserialize;
use tracing::{info, warn};

use super::directory::ActorDirectory;
use crate::auth::{AuthError, TokenVerifier, extract_token};

/// Upgrade route for Designer sockets.
pub const CONNECT_PATH: &str = "/designer/connect";

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

#[derive(Clone)]
struct GatewayState {
    directory: Arc<ActorDirectory>,
    verifier: Arc<dyn TokenVerifier>,
    max_message_size: usize,
}

/// Routes served by the multi-tenant host.
pub fn routes(
    directory: Arc<ActorDirectory>,
    verifier: Arc<dyn TokenVerifier>,
    max_message_size: usize,
) -> Router {
    Router::new()
        .route(CONNECT_PATH, get(connect_handler))
        .with_state(GatewayState {
            directory,
            verifier,
            max_message_size,
        })
}

/// GET /designer/connect
///
/// The token is checked before the upgrade; a refused Designer gets a plain
/// 401 and is never registered anywhere.
async fn connect_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(query): Query<TokenQuery>,
    State(state): State<GatewayState>,
) -> Response {
    let verified = extract_token(&headers, query.token.as_deref())
        .ok_or(AuthError::MissingToken)
        .and_then(|token| state.verifier.verify(token));

    let site = match verified {
        Ok(site) => site,
        Err(e) => {
            warn!(reason = e.label(), "designer connection refused");
            counter!("ws_auth_rejections_total", "reason" => e.label()).increment(1);
            return (StatusCode::UNAUTHORIZED, e.to_string()).into_response();
        }
    };

    info!(site_id = %site, "designer token accepted");
    // The session owns the lease; a failed upgrade drops it with the closure.
    let actor = state.directory.locate_or_create(&site);
    ws.max_message_size(state.max_message_size)
        .on_upgrade(move |socket| async move { actor.accept(socket).await })
        .into_response()
}
