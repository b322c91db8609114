//! Single API server probe.
//!
//! Issues one `GET {endpoint}` over HTTP/1 (plain or TLS, depending on the
//! URL scheme) and reports the time until the response head arrived.

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Uri;
use hyper::rt::{Read, Write};
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::error::ProbeError;

const USER_AGENT: &str = concat!("garden-probe/", env!("CARGO_PKG_VERSION"));

/// Where and how to probe. Cheap to clone.
#[derive(Clone)]
pub struct ApiProber {
    endpoint: String,
    timeout: Duration,
    tls: TlsConnector,
}

impl ApiProber {
    /// Create a prober that trusts the Mozilla root store for HTTPS.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = rustls::ClientConfig::builder_with_provider(
            rustls::crypto::ring::default_provider().into(),
        )
        .with_safe_default_protocol_versions()
        .map_err(|e| ProbeError::Tls(e.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth();

        Ok(Self {
            endpoint: endpoint.to_string(),
            timeout,
            tls: TlsConnector::from(Arc::new(config)),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe one API server and return the elapsed time of a 2xx answer.
    pub async fn probe(&self, api_server_url: &str) -> Result<Duration, ProbeError> {
        let target = Target::parse(api_server_url)?;
        let started = Instant::now();

        tokio::time::timeout(self.timeout, self.send(&target))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))??;

        Ok(started.elapsed())
    }

    async fn send(&self, target: &Target) -> Result<(), ProbeError> {
        let stream = TcpStream::connect((target.host.as_str(), target.port))
            .await
            .map_err(|e| ProbeError::Connect(e.to_string()))?;

        if target.tls {
            let name = ServerName::try_from(target.host.clone())
                .map_err(|e| ProbeError::InvalidUrl(e.to_string()))?;
            let stream = self
                .tls
                .connect(name, stream)
                .await
                .map_err(|e| ProbeError::Tls(e.to_string()))?;
            get(hyper_util::rt::TokioIo::new(stream), target, &self.endpoint).await
        } else {
            get(hyper_util::rt::TokioIo::new(stream), target, &self.endpoint).await
        }
    }
}

/// Host, port and scheme of an API server URL.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    host: String,
    port: u16,
    tls: bool,
}

impl Target {
    fn parse(url: &str) -> Result<Self, ProbeError> {
        let uri: Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| ProbeError::InvalidUrl(e.to_string()))?;
        let tls = match uri.scheme_str() {
            Some("https") => true,
            Some("http") => false,
            Some(other) => return Err(ProbeError::UnsupportedScheme(other.to_string())),
            None => return Err(ProbeError::InvalidUrl(format!("{url} has no scheme"))),
        };
        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ProbeError::InvalidUrl(format!("{url} has no host")))?
            .to_string();
        let port = uri.port_u16().unwrap_or(if tls { 443 } else { 80 });
        Ok(Self { host, port, tls })
    }

    fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

async fn get<I>(io: I, target: &Target, endpoint: &str) -> Result<(), ProbeError>
where
    I: Read + Write + Unpin + Send + 'static,
{
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| ProbeError::Request(e.to_string()))?;

    // Drive the connection in the background.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!(error = %e, "probe connection closed with error");
        }
    });

    let req = http::Request::builder()
        .method("GET")
        .uri(endpoint)
        .header("host", target.authority())
        .header("user-agent", USER_AGENT)
        .body(http_body_util::Empty::<bytes::Bytes>::new())
        .map_err(|e| ProbeError::Request(e.to_string()))?;

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| ProbeError::Request(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(ProbeError::Status(resp.status().as_u16()));
    }
    Ok(())
}
