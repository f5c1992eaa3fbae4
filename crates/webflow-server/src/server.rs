//! `BridgeServer`: axum HTTP + WebSocket hosting for either variant.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use webflow_bridge::{Bridge, DesignerTransport};
use webflow_settings::BridgeMode;

use crate::auth::TokenVerifier;
use crate::config::ServerConfig;
use crate::errors::ServerError;
use crate::health::{self, BridgeStats, HealthResponse};
use crate::local;
use crate::shutdown::ShutdownCoordinator;
use crate::tenant::gateway;
use crate::tenant::{ActorDirectory, TenantTransport};
use crate::websocket::session::SessionConfig;

/// Which variant is being hosted, with its state.
#[derive(Clone)]
pub enum BridgeHost {
    /// One in-process bridge for every site.
    Local(Arc<Bridge>),
    /// One actor per site, admitted by token.
    MultiTenant {
        /// Site actors.
        directory: Arc<ActorDirectory>,
        /// Token check run before every upgrade.
        verifier: Arc<dyn TokenVerifier>,
    },
}

impl BridgeHost {
    /// The hosted variant.
    pub fn mode(&self) -> BridgeMode {
        match self {
            Self::Local(_) => BridgeMode::Local,
            Self::MultiTenant { .. } => BridgeMode::MultiTenant,
        }
    }

    /// Live counters for `/health`.
    pub fn stats(&self) -> BridgeStats {
        match self {
            Self::Local(bridge) => BridgeStats {
                connections: bridge.registry().connection_count(),
                sites: bridge.registry().site_count(),
                pending_calls: bridge.pending().len(),
            },
            Self::MultiTenant { directory, .. } => directory.stats(),
        }
    }

    /// The transport the tool layer should call through.
    pub fn transport(&self) -> Arc<dyn DesignerTransport> {
        match self {
            Self::Local(bridge) => Arc::clone(bridge) as Arc<dyn DesignerTransport>,
            Self::MultiTenant { directory, .. } => {
                Arc::new(TenantTransport::new(directory.clone())) as Arc<dyn DesignerTransport>
            }
        }
    }
}

/// Shared state for the common routes.
#[derive(Clone)]
struct AppState {
    host: BridgeHost,
    start_time: Instant,
    metrics: PrometheusHandle,
}

/// The bridge server.
pub struct BridgeServer {
    config: ServerConfig,
    host: BridgeHost,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    metrics: PrometheusHandle,
}

impl BridgeServer {
    /// Host the local variant.
    pub fn local(config: ServerConfig, metrics: PrometheusHandle) -> Self {
        Self {
            config,
            host: BridgeHost::Local(Arc::new(Bridge::new())),
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
            metrics,
        }
    }

    /// Host the multi-tenant variant, admitting sockets through `verifier`.
    pub fn multi_tenant(
        config: ServerConfig,
        verifier: Arc<dyn TokenVerifier>,
        metrics: PrometheusHandle,
    ) -> Self {
        let shutdown = Arc::new(ShutdownCoordinator::new());
        let directory = Arc::new(ActorDirectory::new(
            SessionConfig::from_server(&config),
            shutdown.token(),
        ));
        Self {
            config,
            host: BridgeHost::MultiTenant {
                directory,
                verifier,
            },
            shutdown,
            start_time: Instant::now(),
            metrics,
        }
    }

    /// Replace the Designer response bound. Call before serving anything.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.host = match self.host {
            BridgeHost::Local(_) => {
                BridgeHost::Local(Arc::new(Bridge::new().with_timeout(timeout)))
            }
            BridgeHost::MultiTenant { verifier, .. } => BridgeHost::MultiTenant {
                directory: Arc::new(
                    ActorDirectory::new(
                        SessionConfig::from_server(&self.config),
                        self.shutdown.token(),
                    )
                    .with_call_timeout(timeout),
                ),
                verifier,
            },
        };
        self
    }

    /// Build the router: `/health`, `/metrics` and the variant's upgrade route.
    pub fn router(&self) -> Router {
        let state = AppState {
            host: self.host.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };
        let common = Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(state);

        let session = SessionConfig::from_server(&self.config);
        let variant = match &self.host {
            BridgeHost::Local(bridge) => local::routes(
                bridge.clone(),
                session,
                self.config.max_message_size,
                self.shutdown.token(),
            ),
            BridgeHost::MultiTenant {
                directory,
                verifier,
            } => gateway::routes(
                directory.clone(),
                verifier.clone(),
                self.config.max_message_size,
            ),
        };

        common
            .merge(variant)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Bind and serve in the background until shutdown.
    ///
    /// Returns the bound address and the serving task.
    pub async fn listen(&self) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
        let listener = bind_listener(&self.config).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = served {
                error!(error = %e, "bridge server stopped with error");
            }
        });

        info!(%addr, mode = ?self.host.mode(), "bridge server listening");
        Ok((addr, handle))
    }

    /// The hosted variant and its state.
    pub fn host(&self) -> &BridgeHost {
        &self.host
    }

    /// The transport the tool layer should call through.
    pub fn transport(&self) -> Arc<dyn DesignerTransport> {
        self.host.transport()
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Bind the configured port, or the first free port in the configured range.
pub async fn bind_listener(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    if let Some(range) = config.port_range {
        for port in range.ports() {
            match TcpListener::bind((config.host.as_str(), port)).await {
                Ok(listener) => return Ok(listener),
                Err(e) => debug!(port, error = %e, "port unavailable, trying next"),
            }
        }
        return Err(ServerError::NoFreePort {
            start: range.start,
            end: range.end,
        });
    }

    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::bind(addr, e))
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time, state.host.stats()))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtTokenVerifier;
    use crate::metrics::detached_handle;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use webflow_settings::PortRange;

    fn local_server() -> BridgeServer {
        BridgeServer::local(ServerConfig::default(), detached_handle())
    }

    fn tenant_server() -> BridgeServer {
        BridgeServer::multi_tenant(
            ServerConfig::default(),
            Arc::new(JwtTokenVerifier::new("secret", None)),
            detached_handle(),
        )
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn health_reports_bridge_counters() {
        let (status, body) = get_json(local_server().router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["connections"], 0);
        assert_eq!(body["sites"], 0);
        assert_eq!(body["pending_calls"], 0);
    }

    #[tokio::test]
    async fn metrics_endpoint_is_text() {
        let resp = local_server()
            .router()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(ct.starts_with("text/plain"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (status, _) = get_json(local_server().router(), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tenant_server_has_no_local_route() {
        let (status, _) = get_json(tenant_server().router(), "/ws?siteId=s").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn modes() {
        assert_eq!(local_server().host().mode(), BridgeMode::Local);
        assert_eq!(tenant_server().host().mode(), BridgeMode::MultiTenant);
    }

    #[tokio::test]
    async fn local_transport_reports_no_connection() {
        let server = local_server();
        let out = server
            .transport()
            .call_tool(Some("s"), "element_tool", serde_json::json!({}))
            .await;
        assert_eq!(out, webflow_core::CallOutcome::NoConnection);
    }

    #[tokio::test]
    async fn listen_on_port_zero() {
        let server = local_server();
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);
        server.shutdown().shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn port_range_skips_taken_ports() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let start = taken.local_addr().unwrap().port();
        let config = ServerConfig {
            port_range: Some(PortRange {
                start,
                end: start.saturating_add(20),
            }),
            ..ServerConfig::default()
        };
        let listener = bind_listener(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), start);
    }

    #[tokio::test]
    async fn exhausted_range_is_an_error() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let config = ServerConfig {
            port_range: Some(PortRange { start: port, end: port }),
            ..ServerConfig::default()
        };
        assert!(matches!(
            bind_listener(&config).await,
            Err(ServerError::NoFreePort { .. })
        ));
    }
}
