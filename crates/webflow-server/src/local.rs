//! Local single-tenant hosting: one bridge, sockets grouped by `?siteId=`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use webflow_bridge::Bridge;
use webflow_core::SiteId;
use webflow_core::constants::MISSING_SITE_ID_MESSAGE;
use webflow_core::frames::ServerFrame;

use crate::websocket::session::{SessionConfig, run_designer_session};

/// Upgrade route for Designer sockets.
pub const WS_PATH: &str = "/ws";

/// Delay between the missing-site error frame and the forced close, so the
/// frame reaches the Designer first.
pub const MISSING_SITE_GRACE: Duration = Duration::from_millis(100);

/// Query string of a connecting Designer.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    /// Site the socket belongs to.
    #[serde(rename = "siteId")]
    pub site_id: Option<String>,
}

#[derive(Clone)]
struct LocalState {
    bridge: Arc<Bridge>,
    session: SessionConfig,
    max_message_size: usize,
    shutdown: CancellationToken,
}

/// Routes served by the local host.
pub fn routes(
    bridge: Arc<Bridge>,
    session: SessionConfig,
    max_message_size: usize,
    shutdown: CancellationToken,
) -> Router {
    Router::new().route(WS_PATH, get(ws_handler)).with_state(LocalState {
        bridge,
        session,
        max_message_size,
        shutdown,
    })
}

/// Connection URL handed to the user for the Designer's bridge app.
///
/// `public_url` wins over the bound address. The site id is left for the
/// Designer app to fill in.
pub fn connection_url(public_url: Option<&str>, addr: SocketAddr) -> String {
    let base = public_url.map_or_else(
        || format!("ws://{addr}"),
        |url| url.trim_end_matches('/').to_owned(),
    );
    format!("{base}{WS_PATH}")
}

/// GET /ws?siteId=...
async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<ConnectQuery>,
    State(state): State<LocalState>,
) -> impl IntoResponse {
    let site = SiteId::parse_opt(query.site_id.as_deref());
    ws.max_message_size(state.max_message_size)
        .on_upgrade(move |socket| async move {
            match site {
                Some(site) => {
                    run_designer_session(socket, site, state.bridge, state.session, state.shutdown)
                        .await;
                }
                None => reject_missing_site(socket).await,
            }
        })
}

/// Send one `error` frame, wait for it to flush, then close.
async fn reject_missing_site(mut socket: WebSocket) {
    debug!("designer connected without siteId");
    match ServerFrame::Error(MISSING_SITE_ID_MESSAGE.to_owned()).encode() {
        Ok(text) => {
            if socket.send(Message::Text(text.into())).await.is_err() {
                return;
            }
        }
        Err(e) => warn!(error = %e, "failed to encode error frame"),
    }
    tokio::time::sleep(MISSING_SITE_GRACE).await;
    let _ = socket.send(Message::Close(None)).await;
}
