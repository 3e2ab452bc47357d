//! Host stand-ins for the firmware's hardware, used by the simulator binary
//! and integration tests.

use std::path::Path;

use anyhow::Context;
use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::WifiCredentials;
use crate::http_client::{HttpClient, HttpError, HttpResponse, MAX_RESPONSE_BYTES};
use crate::network::Network;

/// Answers every request with the same canned status and body.
pub struct FixtureHttpClient {
    status: u16,
    body: Vec<u8>,
    requests: Vec<String>,
}

impl FixtureHttpClient {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            requests: Vec::new(),
        }
    }

    pub fn from_file(path: &Path, status: u16) -> anyhow::Result<Self> {
        let body = std::fs::read(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        info!("Loaded fixture {} ({} bytes)", path.display(), body.len());
        Ok(Self::new(status, body))
    }

    pub fn requests(&self) -> &[String] {
        &self.requests
    }
}

impl HttpClient for FixtureHttpClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError> {
        self.requests.push(url.to_string());
        info!(
            "HTTP GET {} -> status {}",
            url.chars().take(80).collect::<String>(),
            self.status
        );
        if self.status != 200 {
            return Ok(HttpResponse {
                status: self.status,
                body: Vec::new(),
            });
        }
        if self.body.len() > MAX_RESPONSE_BYTES {
            return Err(HttpError::BodyTooLarge(MAX_RESPONSE_BYTES));
        }
        Ok(HttpResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Associates after a fixed number of `is_connected` checks.
pub struct SimulatedNetwork {
    checks_until_up: u32,
    checks: u32,
    ssid: Option<String>,
}

impl SimulatedNetwork {
    pub fn new(checks_until_up: u32) -> Self {
        Self {
            checks_until_up,
            checks: 0,
            ssid: None,
        }
    }

    pub fn ssid(&self) -> Option<&str> {
        self.ssid.as_deref()
    }
}

impl Network for SimulatedNetwork {
    fn begin(&mut self, credentials: &WifiCredentials) -> anyhow::Result<()> {
        self.ssid = Some(credentials.ssid.clone());
        self.checks = 0;
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        if self.ssid.is_none() {
            return false;
        }
        self.checks += 1;
        self.checks > self.checks_until_up
    }

    fn ip_address(&mut self) -> Option<String> {
        self.ssid.as_ref().map(|_| "127.0.0.1".to_string())
    }
}

/// `DelayNs` on top of `std::thread::sleep`.
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        debug!("sleep {} ns", ns);
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_records_requests() {
        let mut http = FixtureHttpClient::new(200, "{}");
        let response = http.get("https://example.test/a").unwrap();
        assert_eq!(response.body, b"{}");
        assert_eq!(http.requests(), ["https://example.test/a"]);
    }

    #[test]
    fn fixture_error_status_has_no_body() {
        let mut http = FixtureHttpClient::new(404, "{}");
        let response = http.get("u").unwrap();
        assert_eq!(response.status, 404);
        assert!(response.body.is_empty());
    }

    #[test]
    fn oversized_fixture_is_rejected() {
        let mut http = FixtureHttpClient::new(200, vec![b' '; MAX_RESPONSE_BYTES + 1]);
        assert!(matches!(http.get("u"), Err(HttpError::BodyTooLarge(_))));
    }

    #[test]
    fn network_needs_begin_before_connecting() {
        let mut net = SimulatedNetwork::new(1);
        assert!(!net.is_connected());
        assert_eq!(net.ip_address(), None);

        net.begin(&WifiCredentials {
            ssid: "lab".into(),
            password: String::new(),
        })
        .unwrap();
        assert!(!net.is_connected());
        assert!(net.is_connected());
        assert_eq!(net.ssid(), Some("lab"));
        assert_eq!(net.ip_address().as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn missing_fixture_file_is_an_error() {
        let err = FixtureHttpClient::from_file(Path::new("/nonexistent/forecast.json"), 200)
            .err()
            .unwrap();
        assert!(err.to_string().contains("reading fixture"));
    }
}
