//! HTTP discovery client.
//!
//! Issues `GET /json` and `GET /json/version` against the debugging
//! endpoint. Each call waits for the port first (memoized), applies the
//! endpoint timeout to both connect and inactivity, and distinguishes
//! three failure kinds callers can match on: readiness/connection
//! ([`Error::Http`] / [`Error::PortTimeout`]), non-2xx status
//! ([`Error::Discovery`] carrying the raw body), and malformed JSON
//! ([`Error::Parse`]).
//!
//! Purely request/response; no retries beyond the implicit port-wait.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::protocol::{DebuggerTarget, VersionInfo};

use super::PortWaiter;

// ============================================================================
// Constants
// ============================================================================

/// Discovery path listing debuggable targets.
const LIST_PATH: &str = "/json";

/// Discovery path for endpoint version information.
const VERSION_PATH: &str = "/json/version";

// ============================================================================
// DiscoveryClient
// ============================================================================

/// HTTP client for the debugging endpoint's discovery paths.
pub struct DiscoveryClient {
    /// Endpoint configuration.
    endpoint: Endpoint,
    /// Memoized readiness probe for this endpoint.
    waiter: PortWaiter,
    /// Underlying HTTP client with connect and request timeouts applied.
    http: reqwest::Client,
}

impl DiscoveryClient {
    /// Creates a discovery client for the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be constructed.
    pub fn new(endpoint: Endpoint) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(endpoint.timeout)
            .timeout(endpoint.timeout)
            .build()?;

        let waiter = PortWaiter::new(endpoint.clone());

        Ok(Self {
            endpoint,
            waiter,
            http,
        })
    }

    /// Lists the endpoint's debuggable targets.
    ///
    /// Descriptor fields pass through from the wire unmodified.
    ///
    /// # Errors
    ///
    /// See [module docs](self) for the failure taxonomy.
    pub async fn list(&self) -> Result<Vec<DebuggerTarget>> {
        self.get_json(LIST_PATH).await
    }

    /// Fetches the endpoint's version information.
    ///
    /// Idempotent: the port-wait happens at most once per client.
    ///
    /// # Errors
    ///
    /// See [module docs](self) for the failure taxonomy.
    pub async fn version(&self) -> Result<VersionInfo> {
        self.get_json(VERSION_PATH).await
    }

    /// Returns the endpoint this client talks to.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Performs one discovery GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.waiter.wait().await?;

        let url = self.endpoint.http_url(path);
        debug!(%url, "Discovery request");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::discovery(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| Error::parse(e.to_string(), body))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal HTTP fixture: serves canned bodies for the discovery
    /// paths and counts accepted connections.
    struct FixtureServer {
        port: u16,
        connections: Arc<AtomicUsize>,
    }

    impl FixtureServer {
        async fn start(version_body: &'static str, list_body: &'static str) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            let port = listener.local_addr().expect("addr").port();
            let connections = Arc::new(AtomicUsize::new(0));

            let counter = Arc::clone(&connections);
            tokio::spawn(async move {
                loop {
                    let Ok((mut stream, _)) = listener.accept().await else {
                        break;
                    };
                    counter.fetch_add(1, Ordering::SeqCst);

                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 1024];
                        let Ok(n) = stream.read(&mut buf).await else {
                            return;
                        };
                        if n == 0 {
                            // Readiness probe: connect-and-drop.
                            return;
                        }

                        let request = String::from_utf8_lossy(&buf[..n]);
                        let path = request.split_whitespace().nth(1).unwrap_or_default();
                        let (status, body) = match path {
                            "/json/version" => ("200 OK", version_body),
                            "/json" => ("200 OK", list_body),
                            _ => ("404 Not Found", "unknown discovery path"),
                        };

                        let response = format!(
                            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        let _ = stream.write_all(response.as_bytes()).await;
                    });
                }
            });

            Self { port, connections }
        }

        fn client(&self) -> DiscoveryClient {
            DiscoveryClient::new(Endpoint::new("127.0.0.1", self.port)).expect("client")
        }
    }

    #[tokio::test]
    async fn test_version_wire_mapping() {
        let server =
            FixtureServer::start(r#"{"Browser":"Node","Protocol-Version":"v1.1"}"#, "[]").await;

        let info = server.client().version().await.expect("version");
        assert_eq!(info.browser, "Node");
        assert_eq!(info.protocol_version, "v1.1");
    }

    #[tokio::test]
    async fn test_version_idempotent_single_port_wait() {
        let server =
            FixtureServer::start(r#"{"Browser":"Node","Protocol-Version":"v1.1"}"#, "[]").await;

        let client = server.client();
        let first = client.version().await.expect("first call");
        let second = client.version().await.expect("second call");
        assert_eq!(first, second);

        // One readiness probe plus at most one TCP connection per HTTP
        // request; a second probe would push this past three.
        assert!(server.connections.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_list_passthrough() {
        let list_body = r#"[
            {"id": "A", "title": "Main", "type": "page", "url": "file:///a",
             "webSocketDebuggerUrl": "ws://127.0.0.1:9229/devtools/page/A"},
            {"id": "B", "title": "Worker", "type": "node", "url": ""}
        ]"#;
        let server = FixtureServer::start("{}", list_body).await;

        let targets = server.client().list().await.expect("list");
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].id, "A");
        assert!(targets[0].is_page());
        assert_eq!(
            targets[0].web_socket_debugger_url.as_deref(),
            Some("ws://127.0.0.1:9229/devtools/page/A")
        );
        assert_eq!(targets[1].target_type, "node");
    }

    #[tokio::test]
    async fn test_non_2xx_surfaces_raw_body() {
        let server = FixtureServer::start("{}", "[]").await;
        let client = server.client();

        // Hit a path the fixture does not know.
        let err = client
            .get_json::<VersionInfo>("/json/unknown")
            .await
            .unwrap_err();

        match err {
            Error::Discovery { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "unknown discovery path");
            }
            other => panic!("expected Discovery error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = FixtureServer::start("not json at all", "[]").await;

        let err = server.client().version().await.unwrap_err();
        match err {
            Error::Parse { body, .. } => assert_eq!(body, "not json at all"),
            other => panic!("expected Parse error, got {other}"),
        }
    }
}
