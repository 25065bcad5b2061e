//! License server transport.
//!
//! The core only needs "send these bytes, get these bytes back, or fail".
//! [`HttpTransport`] (feature `http`) does that with a blocking HTTP POST;
//! tests and embedders can supply their own [`Transport`].

use crate::error::Result;
#[cfg(feature = "http")]
use crate::error::Error;

/// Where and how to deliver a license request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseEndpoint {
    /// License server URL.
    pub url: String,
    /// Value of the `Authorization` header, passed through unchanged.
    pub authorization: Option<String>,
}

impl LicenseEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }
}

/// Delivers a serialized request body and returns the raw response body.
///
/// Implementations report failures (including non-success HTTP statuses) as
/// [`crate::error::Error::Transport`] and never retry.
pub trait Transport {
    fn post(&self, endpoint: &LicenseEndpoint, body: &[u8]) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, endpoint: &LicenseEndpoint, body: &[u8]) -> Result<Vec<u8>> {
        (**self).post(endpoint, body)
    }
}

/// Blocking HTTP transport.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("wvlicense/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Use a preconfigured client (timeouts, proxies).
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
impl Transport for HttpTransport {
    fn post(&self, endpoint: &LicenseEndpoint, body: &[u8]) -> Result<Vec<u8>> {
        let mut request = self.client.post(&endpoint.url).body(body.to_vec());
        if let Some(authorization) = endpoint.authorization.as_deref() {
            request = request.header(reqwest::header::AUTHORIZATION, authorization);
        }

        let response = request
            .send()
            .map_err(|e| Error::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(status.to_string()));
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::Transport(format!("Failed to read response: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::LicenseEndpoint;

    #[test]
    fn endpoint_builder() {
        let endpoint = LicenseEndpoint::new("https://license.example.com/wv")
            .with_authorization("Bearer token");
        assert_eq!(endpoint.url, "https://license.example.com/wv");
        assert_eq!(endpoint.authorization.as_deref(), Some("Bearer token"));
        assert_eq!(LicenseEndpoint::new("x").authorization, None);
    }

    #[cfg(feature = "http")]
    mod http {
        use std::io::{Read, Write};
        use std::net::TcpListener;
        use std::thread::{self, JoinHandle};

        use super::super::{HttpTransport, LicenseEndpoint, Transport};
        use crate::error::Error;

        /// Answer one request with `status` and `body`; the handle yields the
        /// raw request bytes.
        fn serve_once(status: &'static str, body: &'static [u8]) -> (String, JoinHandle<Vec<u8>>) {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            let url = format!("http://{}/license", listener.local_addr().expect("addr"));
            let handle = thread::spawn(move || {
                let (mut stream, _) = listener.accept().expect("accept");
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let n = stream.read(&mut buf).expect("read");
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                    if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                        let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                        let len = head
                            .lines()
                            .find_map(|l| l.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        if request.len() >= end + 4 + len {
                            break;
                        }
                    }
                }
                write!(
                    stream,
                    "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                    status,
                    body.len()
                )
                .expect("write head");
                stream.write_all(body).expect("write body");
                request
            });
            (url, handle)
        }

        #[test]
        fn posts_body_with_authorization() {
            let (url, server) = serve_once("200 OK", b"license-bytes");
            let endpoint = LicenseEndpoint::new(url).with_authorization("Bearer token");
            let response = HttpTransport::new()
                .expect("client")
                .post(&endpoint, b"challenge")
                .expect("post");
            assert_eq!(response, b"license-bytes");

            let request = server.join().expect("server");
            let text = String::from_utf8_lossy(&request).to_lowercase();
            assert!(text.starts_with("post /license "));
            assert!(text.contains("authorization: bearer token"));
            assert!(request.ends_with(b"challenge"));
        }

        #[test]
        fn error_status_is_transport_error() {
            let (url, server) = serve_once("403 Forbidden", b"denied");
            let err = HttpTransport::new()
                .expect("client")
                .post(&LicenseEndpoint::new(url), b"challenge")
                .expect_err("forbidden");
            assert!(matches!(err, Error::Transport(ref status) if status.contains("403")));

            let request = server.join().expect("server");
            let text = String::from_utf8_lossy(&request).to_lowercase();
            assert!(!text.contains("authorization:"));
        }
    }
}
