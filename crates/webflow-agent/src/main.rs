//! # webflow-mcp
//!
//! MCP server binary: loads settings, starts the Designer bridge, and serves
//! the tool catalogue over stdio until stdin closes or Ctrl-C.

#![deny(unsafe_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use webflow_core::logging::{LogFormat, init_subscriber};
use webflow_rpc::McpServer;
use webflow_server::shutdown::DEFAULT_DRAIN_TIMEOUT;
use webflow_server::{BridgeServer, JwtTokenVerifier, ServerConfig};
use webflow_settings::{BridgeMode, WebflowSettings};
use webflow_tools::{DataApiClient, DesignerForwardTool, LocalConnectionTool, SitesTool, ToolRegistry};

/// Webflow MCP server.
#[derive(Parser, Debug)]
#[command(name = "webflow-mcp", about = "Webflow MCP server with the Designer bridge")]
struct Cli {
    /// Settings file (defaults to `~/.webflow-mcp/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Host to bind the bridge on.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the bridge on (0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Bridge mode: `local` or `multi-tenant`.
    #[arg(long, value_parser = parse_mode)]
    mode: Option<BridgeMode>,

    /// Log level filter (`RUST_LOG` still wins).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Overlay command-line values on loaded settings.
    fn apply(&self, settings: &mut WebflowSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
            settings.server.port_range = None;
        }
        if let Some(mode) = self.mode {
            settings.server.mode = mode;
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

fn parse_mode(s: &str) -> Result<BridgeMode, String> {
    BridgeMode::parse(s).ok_or_else(|| format!("unknown mode '{s}' (expected local or multi-tenant)"))
}

fn build_server(settings: &WebflowSettings) -> Result<BridgeServer> {
    let config = ServerConfig::from_settings(&settings.server);
    let metrics =
        webflow_server::metrics::install_recorder().context("Failed to install metrics recorder")?;

    let server = match settings.server.mode {
        BridgeMode::Local => BridgeServer::local(config, metrics),
        BridgeMode::MultiTenant => {
            let secret = settings
                .auth
                .jwt_secret
                .as_deref()
                .context("multi-tenant mode needs auth.jwtSecret")?;
            let verifier = JwtTokenVerifier::new(secret, settings.auth.jwt_issuer.as_deref());
            BridgeServer::multi_tenant(config, Arc::new(verifier), metrics)
        }
    };
    Ok(server)
}

/// Every tool the agent sees. The local bootstrap tool only exists when the
/// bridge runs in local mode.
fn build_tools(
    settings: &WebflowSettings,
    server: &BridgeServer,
    addr: SocketAddr,
) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.extend(DesignerForwardTool::catalogue(&server.transport()));

    if settings.server.mode == BridgeMode::Local {
        let url = webflow_server::local::connection_url(settings.server.public_url.as_deref(), addr);
        registry.register(Arc::new(LocalConnectionTool::new(url)));
    }

    let client = DataApiClient::new(
        &settings.api.base_url,
        settings.api.token.clone(),
        Duration::from_millis(settings.api.timeout_ms),
    )
    .context("Failed to build Data API client")?;
    registry.register(Arc::new(SitesTool::new(client)));
    Ok(registry)
}

/// Grace period for runtime teardown. Stdin is read on a blocking thread
/// that cannot be cancelled.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let result = runtime.block_on(run(cli));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
    result
}

async fn run(cli: Cli) -> Result<()> {
    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(webflow_settings::settings_path);
    let mut settings = webflow_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    cli.apply(&mut settings);
    settings.validate().context("Invalid settings")?;

    init_subscriber(
        &settings.logging.level,
        LogFormat::from_str_lossy(&settings.logging.format),
    );

    let server = build_server(&settings)?;
    let (addr, server_handle) = server.listen().await.context("Failed to bind bridge server")?;
    tracing::info!(%addr, mode = ?settings.server.mode, "Designer bridge listening");

    let tools = build_tools(&settings, &server, addr)?;
    tracing::info!(tools = tools.len(), "MCP tools registered");

    let shutdown = server.shutdown().clone();
    let ctrl_c = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { shutdown.shutdown_on_ctrl_c().await })
    };

    let served = webflow_rpc::serve(
        tokio::io::stdin(),
        tokio::io::stdout(),
        McpServer::new(Arc::new(tools)),
        shutdown.token(),
    )
    .await;

    tracing::info!("Shutting down...");
    shutdown
        .drain(vec![server_handle, ctrl_c], DEFAULT_DRAIN_TIMEOUT)
        .await;
    served.context("MCP stdio loop failed")?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use webflow_core::constants::{LOCAL_CONNECTION_TOOL, SITES_TOOL};
    use webflow_server::metrics::detached_handle;

    fn addr() -> SocketAddr {
        "127.0.0.1:1338".parse().unwrap()
    }

    #[test]
    fn cli_defaults_leave_settings_alone() {
        let cli = Cli::parse_from(["webflow-mcp"]);
        let mut settings = WebflowSettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 1338);
        assert_eq!(settings.server.mode, BridgeMode::Local);
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::parse_from([
            "webflow-mcp",
            "--host",
            "0.0.0.0",
            "--port",
            "4000",
            "--mode",
            "multi-tenant",
            "--log-level",
            "debug",
        ]);
        let mut settings = WebflowSettings::default();
        settings.server.port_range = webflow_settings::PortRange::parse("1338-1348");
        cli.apply(&mut settings);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 4000);
        assert!(settings.server.port_range.is_none());
        assert_eq!(settings.server.mode, BridgeMode::MultiTenant);
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["webflow-mcp", "--mode", "cluster"]).is_err());
    }

    #[test]
    fn cli_settings_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"port": 0}}"#).unwrap();
        let cli = Cli::parse_from(["webflow-mcp", "--settings", path.to_str().unwrap()]);
        let settings = webflow_settings::load_settings_from_path(cli.settings.as_ref().unwrap()).unwrap();
        assert_eq!(settings.server.port, 0);
    }

    #[test]
    fn local_mode_lists_bootstrap_tool() {
        let settings = WebflowSettings::default();
        let server = BridgeServer::local(ServerConfig::default(), detached_handle());
        let tools = build_tools(&settings, &server, addr()).unwrap();
        assert!(tools.contains(LOCAL_CONNECTION_TOOL));
        assert!(tools.contains(SITES_TOOL));
        assert!(tools.contains("element_tool"));
    }

    #[test]
    fn multi_tenant_mode_has_no_bootstrap_tool() {
        let mut settings = WebflowSettings::default();
        settings.server.mode = BridgeMode::MultiTenant;
        settings.auth.jwt_secret = Some("secret".into());
        let verifier = Arc::new(JwtTokenVerifier::new("secret", None));
        let server = BridgeServer::multi_tenant(ServerConfig::default(), verifier, detached_handle());
        let tools = build_tools(&settings, &server, addr()).unwrap();
        assert!(!tools.contains(LOCAL_CONNECTION_TOOL));
        assert!(tools.contains("whtml_builder"));
    }

    #[test]
    fn bad_api_base_url_fails_tool_setup() {
        let mut settings = WebflowSettings::default();
        settings.api.base_url = "not a url".into();
        let server = BridgeServer::local(ServerConfig::default(), detached_handle());
        let Err(err) = build_tools(&settings, &server, addr()) else {
            panic!("invalid base URL was accepted");
        };
        assert!(err.to_string().contains("Data API client"));
    }
}
