//! Package-level constants shared by every transport variant.

use std::time::Duration;

/// Current version (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name reported over MCP.
pub const NAME: &str = "webflow-mcp";

/// Upper bound on how long a Designer call waits for its first response.
///
/// Both the local and the multi-tenant host use this exact value.
pub const TOOL_CALL_TIMEOUT_MS: u64 = 20_000;

/// [`TOOL_CALL_TIMEOUT_MS`] as a [`Duration`].
pub const TOOL_CALL_TIMEOUT: Duration = Duration::from_millis(TOOL_CALL_TIMEOUT_MS);

/// Name of the local bootstrap tool that hands out the connection URL.
pub const LOCAL_CONNECTION_TOOL: &str = "local_de_mcp_connection_tool";

/// Name of the REST site-listing tool referenced by the guidance texts.
pub const SITES_TOOL: &str = "data_sites_tool";

/// Error text for a call made without a site id.
pub const SITE_ID_REQUIRED: &str = "Site ID is required";

/// Error text when no Designer socket is registered for the site.
pub const NO_CONNECTION_MESSAGE: &str = "No active Designer app connection found for this site. \
Ask the user to open the Webflow Designer for this site and launch the MCP Bridge app, \
then verify the site ID with the data_sites_tool (action: list_sites).";

/// Error text when the Designer was reached but never answered.
pub const TIMEOUT_MESSAGE: &str = "Tool call timed out: the Webflow Designer app did not respond \
within 20 seconds. Ask the user to check that the MCP Bridge app is running in the Designer, \
or to close and reopen it, then try again.";

/// Confirmation text sent to a freshly registered Designer socket.
pub const CONNECTION_CONFIRMED_MESSAGE: &str = "Connected to Webflow MCP server";

/// Error text sent to a socket that connected without a site id.
pub const MISSING_SITE_ID_MESSAGE: &str = "siteId query parameter is required";
