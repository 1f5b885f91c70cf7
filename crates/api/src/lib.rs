//! HTTP client and configuration for the dispute data services.
//!
//! The pipeline talks to three kinds of endpoints: GraphQL subgraphs, plain
//! JSON documents, and IPFS gateways. All of them go through [`VerdictClient`],
//! which owns a `reqwest::Client` configured from [`SdkConfig`]:
//!
//! - default `Accept: application/json` and User-Agent headers
//! - an optional bearer token (`apiKey` / `VERDICT_API_KEY`), attached only to
//!   requests for the configured subgraph hosts
//! - a request timeout
//!
//! Mapping URLs come from template authors, so the token never travels as a
//! client-wide default header.
//!
//! Every URL is validated before a request is built: non-local hosts must use
//! HTTPS.
//!
//! # Example
//!
//! ```ignore
//! use verdict_api::{SdkConfig, VerdictClient};
//!
//! let config = SdkConfig::load(None)?;
//! let client = VerdictClient::new(&config)?;
//! let response = client
//!     .request(reqwest::Method::GET, "https://cdn.kleros.link/ipfs/QmHash/policy.json")?
//!     .send()
//!     .await?;
//! ```

pub mod config;

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Method, RequestBuilder, Url, header};
use tracing::debug;

pub use config::{ConfigError, SdkConfig, default_config_path};

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Thin wrapper around a configured `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct VerdictClient {
    pub http: Client,
    pub user_agent: String,
    authorization: Option<header::HeaderValue>,
    authorized_hosts: Vec<String>,
}

impl VerdictClient {
    /// Build a client from resolved configuration.
    pub fn new(config: &SdkConfig) -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let authorization = match config.api_key.as_deref() {
            Some(api_key) => {
                let mut value = header::HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .context("apiKey contains characters not allowed in a header")?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };
        let authorized_hosts = [config.core_subgraph.as_deref(), config.dtr_subgraph.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(|endpoint| Url::parse(endpoint.trim()).ok())
            .filter_map(|endpoint| host_key(&endpoint))
            .collect();

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("build http client")?;

        Ok(Self {
            http,
            user_agent: config.user_agent.clone(),
            authorization,
            authorized_hosts,
        })
    }

    /// Build a request for an absolute URL after validating it.
    ///
    /// The bearer token is added only when the URL's host and port match a
    /// configured subgraph endpoint.
    pub fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let parsed = validate_url(url)?;
        let authorized = host_key(&parsed).is_some_and(|key| self.authorized_hosts.contains(&key));
        debug!(
            %method,
            host = parsed.host_str().unwrap_or_default(),
            path = parsed.path(),
            authorized,
            "building request"
        );

        let builder = self
            .http
            .request(method, parsed)
            .header(header::USER_AGENT, &self.user_agent);
        Ok(match &self.authorization {
            Some(value) if authorized => builder.header(header::AUTHORIZATION, value.clone()),
            _ => builder,
        })
    }
}

/// `host:port` with the scheme's default port filled in.
fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let port = url.port_or_known_default()?;
    Some(format!("{host}:{port}"))
}

/// Validate that a URL is acceptable for outbound requests.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|error| anyhow!("invalid URL '{}': {}", url, error))?;
    let host_name = parsed
        .host_str()
        .ok_or_else(|| anyhow!("URL '{}' must include a host", url))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(parsed);
    }

    if parsed.scheme() != "https" {
        return Err(anyhow!(
            "URL must use https for non-localhost hosts; got '{}://{}'",
            parsed.scheme(),
            host_name
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_url_allows_https_and_localhost() {
        assert!(validate_url("https://api.studio.thegraph.com/query/1/core/v1").is_ok());
        assert!(validate_url("http://localhost:8000/subgraphs/name/dtr").is_ok());
        assert!(validate_url("http://127.0.0.1:5001/ipfs/QmHash").is_ok());
    }

    #[test]
    fn validate_url_rejects_plain_http_and_garbage() {
        let error = validate_url("http://example.org/data.json").unwrap_err();
        assert!(error.to_string().contains("https"));
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn client_sets_user_agent_on_requests() {
        let config = SdkConfig {
            user_agent: "verdict-tests/1.0".to_string(),
            api_key: Some("secret-token".to_string()),
            ..SdkConfig::default()
        };
        let client = VerdictClient::new(&config).expect("client");
        let request = client
            .request(Method::GET, "https://cdn.example.org/ipfs/QmHash")
            .expect("request")
            .build()
            .expect("build request");

        assert_eq!(request.headers()[header::USER_AGENT], "verdict-tests/1.0");
        assert_eq!(request.url().as_str(), "https://cdn.example.org/ipfs/QmHash");
    }

    fn api_key_config(core_subgraph: Option<String>) -> SdkConfig {
        SdkConfig {
            api_key: Some("gateway-secret".to_string()),
            core_subgraph,
            dtr_subgraph: Some("https://dtr.example.org/subgraphs/dtr".to_string()),
            ..SdkConfig::default()
        }
    }

    /// Accepts one connection and returns the lower-cased request head.
    fn capture_request_head() -> (u16, std::thread::JoinHandle<String>) {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let port = listener.local_addr().expect("listener address").port();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut head: Vec<u8> = Vec::new();
            let mut buffer = [0u8; 1024];
            while !head.windows(4).any(|window| window == b"\r\n\r\n".as_slice()) {
                let read = stream.read(&mut buffer).expect("read request");
                if read == 0 {
                    break;
                }
                head.extend_from_slice(&buffer[..read]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}")
                .expect("write response");
            String::from_utf8_lossy(&head).to_ascii_lowercase()
        });
        (port, server)
    }

    #[tokio::test]
    async fn api_key_stays_off_template_chosen_hosts() {
        let (port, server) = capture_request_head();
        let client = VerdictClient::new(&api_key_config(Some("https://core.example.org/subgraphs/core".to_string())))
            .expect("client");

        client
            .request(Method::GET, &format!("http://127.0.0.1:{port}/any-template-url.json"))
            .expect("request")
            .send()
            .await
            .expect("send");

        let head = server.join().expect("server thread");
        assert!(head.starts_with("get /any-template-url.json"), "head: {head}");
        assert!(!head.contains("authorization"), "head: {head}");
        assert!(!head.contains("gateway-secret"), "head: {head}");
    }

    #[tokio::test]
    async fn api_key_reaches_configured_subgraph_host() {
        let (port, server) = capture_request_head();
        let core = format!("http://127.0.0.1:{port}/subgraphs/core");
        let client = VerdictClient::new(&api_key_config(Some(core.clone()))).expect("client");

        client.request(Method::POST, &core).expect("request").send().await.expect("send");

        let head = server.join().expect("server thread");
        assert!(head.contains("authorization: bearer gateway-secret"), "head: {head}");
    }

    #[test]
    fn api_key_matches_host_and_port() {
        let client = VerdictClient::new(&api_key_config(None)).expect("client");
        let header_for = |url: &str| {
            client
                .request(Method::POST, url)
                .expect("request")
                .build()
                .expect("build request")
                .headers()
                .get(header::AUTHORIZATION)
                .cloned()
        };

        assert!(header_for("https://DTR.example.org/other/path").is_some());
        assert!(header_for("https://dtr.example.org:8443/subgraphs/dtr").is_none());
        assert!(header_for("https://dtr.example.org.evil.test/subgraphs/dtr").is_none());
        assert!(header_for("https://cdn.example.org/ipfs/QmHash").is_none());
    }

    #[test]
    fn client_rejects_header_unsafe_api_key() {
        let config = SdkConfig {
            api_key: Some("line\nbreak".to_string()),
            ..SdkConfig::default()
        };
        assert!(VerdictClient::new(&config).is_err());
    }
}
