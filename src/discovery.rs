//! HTTP discovery client for the browser's `/json/*` endpoints.
//!
//! Discovery is the one-shot bootstrap step before the WebSocket exists:
//! ask the browser's debugging HTTP server what targets it has, pick one,
//! and hand its `webSocketDebuggerUrl` to [`crate::Connection::connect`].
//!
//! # Endpoints
//!
//! | Endpoint | Method | Purpose |
//! |----------|--------|---------|
//! | `/json/version` | GET | Browser and protocol version info |
//! | `/json/list` | GET | All debuggable targets |
//! | `/json/new?{url}` | PUT | Open a new tab |
//! | `/json/activate/{id}` | GET | Bring a tab to the foreground |
//! | `/json/close/{id}` | GET | Close a tab |
//! | `/json/protocol` | GET | Full protocol schema |

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::TargetId;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for each discovery HTTP request.
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// VersionInfo
// ============================================================================

/// Payload of `/json/version`.
///
/// Key naming on this endpoint is historic and inconsistent; the renames
/// below match what Chromium actually sends.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    /// Browser name and version, e.g. `Chrome/126.0.6478.55`.
    #[serde(rename = "Browser")]
    pub browser: String,

    /// DevTools protocol version, e.g. `1.3`.
    #[serde(rename = "Protocol-Version")]
    pub protocol_version: String,

    /// Browser user agent.
    #[serde(rename = "User-Agent", default)]
    pub user_agent: String,

    /// V8 version.
    #[serde(rename = "V8-Version", default)]
    pub v8_version: String,

    /// WebKit version string.
    #[serde(rename = "WebKit-Version", default)]
    pub webkit_version: String,

    /// Browser-level WebSocket endpoint, if exposed.
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}

// ============================================================================
// TargetInfo
// ============================================================================

/// One debuggable target as reported by `/json/list` and `/json/new`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    /// Target ID.
    pub id: TargetId,

    /// Target type (`page`, `iframe`, `service_worker`, ...).
    #[serde(rename = "type")]
    pub target_type: String,

    /// Page title.
    #[serde(default)]
    pub title: String,

    /// Current URL.
    #[serde(default)]
    pub url: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// DevTools frontend URL.
    #[serde(default)]
    pub devtools_frontend_url: Option<String>,

    /// WebSocket endpoint for this target.
    ///
    /// Absent when another debugger is already attached.
    #[serde(default)]
    pub web_socket_debugger_url: Option<String>,
}

impl TargetInfo {
    /// Returns `true` if this target is a page (top-level tab).
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }

    /// Returns the target's WebSocket endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] if the browser did not expose one,
    /// which means another debugger is attached to this target.
    pub fn ws_url(&self) -> Result<&str> {
        self.web_socket_debugger_url.as_deref().ok_or_else(|| {
            Error::discovery(format!(
                "target {} has no webSocketDebuggerUrl (another client attached?)",
                self.id
            ))
        })
    }
}

// ============================================================================
// DiscoveryClient
// ============================================================================

/// Client for the browser's debugging HTTP server.
///
/// # Example
///
/// ```ignore
/// use cdp_client::{Connection, DiscoveryClient};
///
/// let discovery = DiscoveryClient::new("http://127.0.0.1:9222")?;
/// let target = discovery.first_page().await?;
/// let connection = Connection::connect(target.ws_url()?).await?;
/// ```
pub struct DiscoveryClient {
    /// HTTP client.
    http: reqwest::Client,
    /// Base URL of the debugging server.
    base: Url,
}

impl DiscoveryClient {
    /// Creates a discovery client for a debugging server base URL,
    /// typically `http://127.0.0.1:9222`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] if the base URL does not parse, or
    /// [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| Error::discovery(format!("invalid base URL {base}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(DISCOVERY_TIMEOUT)
            .build()?;

        Ok(Self { http, base })
    }

    /// Returns the base URL of the debugging server.
    #[inline]
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Fetches `/json/version`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure or an unparsable
    /// payload, [`Error::Discovery`] on a non-success status.
    pub async fn version(&self) -> Result<VersionInfo> {
        let url = self.endpoint("json/version")?;
        let response = self.http.get(url).send().await?;
        Self::check_status("/json/version", &response)?;
        Ok(response.json().await?)
    }

    /// Returns the browser-level WebSocket endpoint from `/json/version`.
    ///
    /// Connecting to this endpoint instead of a page target gives access
    /// to browser-wide domains (`Target`, `Browser`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] if the browser did not expose one.
    pub async fn browser_ws_url(&self) -> Result<String> {
        let version = self.version().await?;
        version
            .web_socket_debugger_url
            .ok_or_else(|| Error::discovery("browser exposes no webSocketDebuggerUrl"))
    }

    /// Fetches `/json/list`, returning every debuggable target.
    ///
    /// # Errors
    ///
    /// Same as [`DiscoveryClient::version`].
    pub async fn targets(&self) -> Result<Vec<TargetInfo>> {
        let url = self.endpoint("json/list")?;
        let response = self.http.get(url).send().await?;
        Self::check_status("/json/list", &response)?;

        let targets: Vec<TargetInfo> = response.json().await?;
        debug!(count = targets.len(), "Discovered targets");
        Ok(targets)
    }

    /// Returns the first `page` target from `/json/list`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchTarget`] if the browser has no page target.
    pub async fn first_page(&self) -> Result<TargetInfo> {
        let targets = self.targets().await?;
        targets
            .into_iter()
            .find(TargetInfo::is_page)
            .ok_or_else(|| Error::no_such_target("page"))
    }

    /// Opens a new tab via `/json/new`, optionally at a URL.
    ///
    /// Uses HTTP PUT; Chrome 111+ rejects GET on this endpoint.
    ///
    /// # Errors
    ///
    /// Same as [`DiscoveryClient::version`].
    pub async fn new_tab(&self, url: Option<&str>) -> Result<TargetInfo> {
        let mut endpoint = self.endpoint("json/new")?;
        if let Some(url) = url {
            endpoint.set_query(Some(url));
        }

        let response = self.http.put(endpoint).send().await?;
        Self::check_status("/json/new", &response)?;
        Ok(response.json().await?)
    }

    /// Brings a tab to the foreground via `/json/activate/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] on a non-success status (unknown id).
    pub async fn activate(&self, id: &TargetId) -> Result<()> {
        let url = self.endpoint(&format!("json/activate/{id}"))?;
        let response = self.http.get(url).send().await?;
        Self::check_status("/json/activate", &response)
    }

    /// Closes a tab via `/json/close/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] on a non-success status (unknown id).
    pub async fn close_target(&self, id: &TargetId) -> Result<()> {
        let url = self.endpoint(&format!("json/close/{id}"))?;
        let response = self.http.get(url).send().await?;
        Self::check_status("/json/close", &response)
    }

    /// Fetches the full protocol schema from `/json/protocol`.
    ///
    /// The schema is large and only interesting to code generators, so it
    /// stays an untyped [`Value`].
    ///
    /// # Errors
    ///
    /// Same as [`DiscoveryClient::version`].
    pub async fn protocol(&self) -> Result<Value> {
        let url = self.endpoint("json/protocol")?;
        let response = self.http.get(url).send().await?;
        Self::check_status("/json/protocol", &response)?;
        Ok(response.json().await?)
    }

    /// Joins a path onto the base URL.
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::discovery(format!("invalid endpoint {path}: {e}")))
    }

    /// Maps a non-success status to a discovery error.
    fn check_status(endpoint: &str, response: &reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::discovery(format!("{endpoint} returned {status}")))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
