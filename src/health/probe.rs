// ABOUTME: Single-attempt endpoint probes used by the health verifier.
// ABOUTME: HttpProbe issues a plain HTTP/1.1 GET over a tokio TCP stream using hyper.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Empty;
use hyper::Uri;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        source: std::io::Error,
    },

    #[error("HTTP request to {endpoint} failed: {reason}")]
    Http { endpoint: String, reason: String },
}

/// One attempt against an endpoint, returning the observed status code.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn get(&self, endpoint: &str) -> Result<u16, ProbeError>;
}

/// Probe for `http://` endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpProbe;

impl HttpProbe {
    fn parse(endpoint: &str) -> Result<(String, u16, String, String), ProbeError> {
        let invalid = |reason: &str| ProbeError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        };

        let uri = endpoint
            .parse::<Uri>()
            .map_err(|e| invalid(&e.to_string()))?;

        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => return Err(invalid(&format!("unsupported scheme '{other}'"))),
            None => return Err(invalid("missing scheme")),
        }

        let host = uri.host().ok_or_else(|| invalid("missing host"))?.to_string();
        let port = uri.port_u16().unwrap_or(80);
        let authority = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .unwrap_or_else(|| host.clone());
        let path = uri
            .path_and_query()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        Ok((host, port, authority, path))
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn get(&self, endpoint: &str) -> Result<u16, ProbeError> {
        let (host, port, authority, path) = Self::parse(endpoint)?;
        let http_err = |reason: String| ProbeError::Http {
            endpoint: endpoint.to_string(),
            reason,
        };

        let host = host.trim_start_matches('[').trim_end_matches(']');
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|source| ProbeError::Connect {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| http_err(format!("handshake failed: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("health probe connection error: {}", e);
            }
        });

        let req = hyper::Request::builder()
            .method("GET")
            .uri(path)
            .header(hyper::header::HOST, authority)
            .header(hyper::header::USER_AGENT, concat!("deployctl/", env!("CARGO_PKG_VERSION")))
            .body(Empty::<Bytes>::new())
            .map_err(|e| http_err(format!("failed to build request: {e}")))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| http_err(e.to_string()))?;

        Ok(resp.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_http_endpoint() {
        let (host, port, authority, path) =
            HttpProbe::parse("http://localhost:8080/health?full=1").unwrap();
        assert_eq!(host, "localhost");
        assert_eq!(port, 8080);
        assert_eq!(authority, "localhost:8080");
        assert_eq!(path, "/health?full=1");
    }

    #[test]
    fn defaults_port_and_path() {
        let (_, port, _, path) = HttpProbe::parse("http://example.com").unwrap();
        assert_eq!(port, 80);
        assert_eq!(path, "/");
    }

    #[test]
    fn rejects_https_and_relative() {
        assert!(matches!(
            HttpProbe::parse("https://example.com/health"),
            Err(ProbeError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            HttpProbe::parse("/health"),
            Err(ProbeError::InvalidEndpoint { .. })
        ));
    }
}
