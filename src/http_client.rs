use thiserror::Error;

/// Upper bound on a buffered response body.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;
pub const TIMEOUT_MS: u64 = 15_000;

const READ_CHUNK: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("response too large (>{0} bytes)")]
    BodyTooLarge(usize),
}

/// One blocking GET. Implemented by the ESP-IDF client on the device and by
/// fixture clients on the host.
pub trait HttpClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError>;
}

impl<T: HttpClient + ?Sized> HttpClient for &mut T {
    fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError> {
        (**self).get(url)
    }
}

/// Drain `read` into memory, failing once more than `limit` bytes arrive.
/// `read` follows the `Read::read` contract: `Ok(0)` marks the end.
pub fn read_bounded<E, F>(mut read: F, limit: usize) -> Result<Vec<u8>, HttpError>
where
    E: core::fmt::Display,
    F: FnMut(&mut [u8]) -> Result<usize, E>,
{
    let mut body: Vec<u8> = Vec::new();
    let mut buf = [0u8; READ_CHUNK];
    loop {
        let n = read(&mut buf).map_err(|e| HttpError::Connection(e.to_string()))?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
        if body.len() > limit {
            return Err(HttpError::BodyTooLarge(limit));
        }
    }
    Ok(body)
}

#[cfg(target_os = "espidf")]
pub use esp::EspHttpClient;

#[cfg(target_os = "espidf")]
mod esp {
    use anyhow::Result;
    use embedded_svc::http::client::Client;
    use embedded_svc::http::{Method, Status};
    use embedded_svc::io::Read;
    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
    use log::info;

    use super::{read_bounded, HttpClient, HttpError, HttpResponse, MAX_RESPONSE_BYTES, TIMEOUT_MS};

    /// HTTPS client with the ESP-IDF certificate bundle attached.
    pub struct EspHttpClient {
        client: Client<EspHttpConnection>,
    }

    impl EspHttpClient {
        pub fn new() -> Result<Self> {
            let config = Configuration {
                timeout: Some(std::time::Duration::from_millis(TIMEOUT_MS)),
                use_global_ca_store: true,
                crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
                ..Default::default()
            };
            let connection = EspHttpConnection::new(&config)?;
            Ok(Self {
                client: Client::wrap(connection),
            })
        }
    }

    impl HttpClient for EspHttpClient {
        fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError> {
            let headers = [("Accept", "application/json")];
            let mut response = self
                .client
                .request(Method::Get, url, &headers)
                .and_then(|request| request.submit())
                .map_err(|e| HttpError::Connection(format!("{:?}", e)))?;

            let status = response.status();
            info!(
                "HTTP GET {} -> status {}",
                url.chars().take(80).collect::<String>(),
                status
            );
            if status != 200 {
                return Ok(HttpResponse {
                    status,
                    body: Vec::new(),
                });
            }

            let body = read_bounded(
                |buf| response.read(buf).map_err(|e| format!("{:?}", e)),
                MAX_RESPONSE_BYTES,
            )?;
            Ok(HttpResponse { status, body })
        }
    }
}
