//! The per-site actor.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::extract::ws::WebSocket;
use axum::http::{Request, Response};
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tracing::{debug, instrument};
use webflow_bridge::Bridge;
use webflow_core::{CallOutcome, SiteId};

use crate::websocket::session::{SessionConfig, run_designer_session};

/// Internal route the directory forwards calls to.
pub const CALL_TOOL_PATH: &str = "/call-tool";

/// Body of an internal call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolRequest {
    /// Designer tool to run.
    pub tool_name: String,
    /// Tool arguments.
    #[serde(default)]
    pub args: Value,
}

/// Owns one site's sockets and pending calls.
pub struct SiteActor {
    name: String,
    site: SiteId,
    bridge: Arc<Bridge>,
    router: Router,
    session: SessionConfig,
    shutdown: CancellationToken,
    leases: AtomicUsize,
}

impl SiteActor {
    /// Create the actor for `site`.
    pub fn new(
        site: SiteId,
        session: SessionConfig,
        call_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        let bridge = Arc::new(Bridge::new().with_timeout(call_timeout));
        let router = Router::new()
            .route(CALL_TOOL_PATH, post(call_tool_handler))
            .with_state(ActorState {
                site: site.clone(),
                bridge: bridge.clone(),
            });
        Self {
            name: site.actor_name(),
            site,
            bridge,
            router,
            session,
            shutdown,
            leases: AtomicUsize::new(0),
        }
    }

    /// Deterministic name, `site:{id}`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The site this actor serves.
    pub fn site(&self) -> &SiteId {
        &self.site
    }

    /// The actor's private bridge.
    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    /// Outstanding directory leases on this actor.
    pub fn leases(&self) -> usize {
        self.leases.load(Ordering::Acquire)
    }

    pub(crate) fn retain(&self) {
        let _ = self.leases.fetch_add(1, Ordering::AcqRel);
    }

    /// Drop one lease and return how many remain.
    pub(crate) fn release(&self) -> usize {
        self.leases.fetch_sub(1, Ordering::AcqRel) - 1
    }

    /// Handle an internal HTTP request.
    pub async fn fetch(&self, request: Request<Body>) -> Response<Body> {
        let result: Result<_, Infallible> = self.router.clone().oneshot(request).await;
        match result {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Serve an already verified Designer socket until it closes.
    pub async fn accept(&self, ws: WebSocket) {
        run_designer_session(
            ws,
            self.site.clone(),
            self.bridge.clone(),
            self.session,
            self.shutdown.clone(),
        )
        .await;
    }
}

#[derive(Clone)]
struct ActorState {
    site: SiteId,
    bridge: Arc<Bridge>,
}

/// POST /call-tool
#[instrument(skip_all, fields(site_id = %state.site, tool_name = %req.tool_name))]
async fn call_tool_handler(
    State(state): State<ActorState>,
    Json(req): Json<CallToolRequest>,
) -> Json<CallOutcome> {
    let outcome = state
        .bridge
        .call_tool(Some(state.site.as_str()), &req.tool_name, req.args)
        .await;
    debug!(outcome = outcome.label(), "actor call finished");
    Json(outcome)
}
