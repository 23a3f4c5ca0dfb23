use crate::cli::Cli;
use crate::error::CliError;
use crate::transport::RetryPolicy;
use std::time::Duration;
use url::Url;

/// How long the UI keeps showing the loading indicator before classifying the
/// server as unreachable. Independent of the transport's retry bound.
pub const LOADING_TIMEOUT: Duration = Duration::from_millis(3000);

const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: Url,
    pub retry: RetryPolicy,
    pub ping_interval: Duration,
    pub loading_timeout: Duration,
    pub probe_timeout: Duration,
}

impl ClientConfig {
    pub fn new(server: impl AsRef<str>) -> Result<Self, CliError> {
        let mut base = server.as_ref().trim().to_string();
        if base.is_empty() {
            return Err(CliError::InvalidServerUrl(
                "server url cannot be empty".into(),
            ));
        }
        if !base.contains("://") {
            let scheme = infer_scheme(&base);
            base = format!("{scheme}{base}");
        }
        let parsed =
            Url::parse(&base).map_err(|err| CliError::InvalidServerUrl(err.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(CliError::InvalidServerUrl(format!(
                    "unsupported scheme '{other}'"
                )));
            }
        }
        Ok(Self {
            base_url: parsed,
            retry: RetryPolicy::default(),
            ping_interval: Duration::from_secs(30),
            loading_timeout: LOADING_TIMEOUT,
            probe_timeout: HEALTH_PROBE_TIMEOUT,
        })
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut config = Self::new(&cli.server)?;
        config.retry = RetryPolicy {
            attempts: cli.retry_attempts.max(1),
            delay: Duration::from_millis(cli.retry_delay_ms),
        };
        config.ping_interval = Duration::from_secs(cli.ping_interval_secs.max(1));
        Ok(config)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Stateless health-check endpoint, probed once before connecting.
    pub fn health_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/health");
        url.set_query(None);
        url
    }

    /// Persistent session endpoint derived from the base url.
    pub fn websocket_url(&self) -> Url {
        let mut url = self.base_url.clone();
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        let _ = url.set_scheme(scheme);
        url.set_path("/ws");
        url.set_query(None);
        url
    }
}

fn infer_scheme(base: &str) -> &'static str {
    if base.starts_with("localhost") || base.starts_with("127.0.0.1") {
        "http://"
    } else {
        "https://"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_ws_and_health_urls() {
        let config = ClientConfig::new("http://localhost:8080").unwrap();
        assert_eq!(config.websocket_url().as_str(), "ws://localhost:8080/ws");
        assert_eq!(config.health_url().as_str(), "http://localhost:8080/health");
    }

    #[test]
    fn https_upgrades_to_wss() {
        let config = ClientConfig::new("https://shell.example.com").unwrap();
        assert_eq!(config.websocket_url().scheme(), "wss");
    }

    #[test]
    fn bare_localhost_infers_http() {
        let config = ClientConfig::new("localhost:8080").unwrap();
        assert_eq!(config.base_url().scheme(), "http");
    }

    #[test]
    fn bare_host_infers_https() {
        let config = ClientConfig::new("shell.example.com").unwrap();
        assert_eq!(config.base_url().scheme(), "https");
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(ClientConfig::new("ftp://example.com").is_err());
        assert!(ClientConfig::new("   ").is_err());
    }
}
