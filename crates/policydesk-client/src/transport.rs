//! HTTP/1 transport for the policy backend.
//!
//! Opens one connection per call and drives it with hyper's low-level
//! client connection. Session handling stays outside: an optional
//! cookie is forwarded as-is.

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, COOKIE, HOST, USER_AGENT};
use http::{Method, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use tracing::debug;

use policydesk_core::{
    CreateResponse, NewPolicy, PoliciesEnvelope, PolicyRecord, SalespeopleEnvelope,
    SalespersonRecord,
};

use crate::backend::{BackendFuture, PolicyBackend};
use crate::error::{ClientError, ClientResult};

const POLICIES_PATH: &str = "/api/policies";
const SALESPEOPLE_PATH: &str = "/api/salespeople";

/// [`PolicyBackend`] over plain HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    /// `host:port` to connect to.
    address: String,
    /// Value of the `Host` header.
    authority: String,
    /// Path prefix from the base URL, without trailing slash.
    prefix: String,
    session_cookie: Option<String>,
}

impl HttpBackend {
    /// Build a backend from a base URL such as `http://127.0.0.1:5000`.
    pub fn new(base_url: &str, session_cookie: Option<String>) -> ClientResult<Self> {
        let uri: Uri = base_url
            .parse()
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;

        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => {
                return Err(ClientError::InvalidUrl(format!(
                    "{base_url}: unsupported scheme {other}"
                )));
            }
            None => {
                return Err(ClientError::InvalidUrl(format!("{base_url}: missing scheme")));
            }
        }

        let authority = uri
            .authority()
            .ok_or_else(|| ClientError::InvalidUrl(format!("{base_url}: missing host")))?;
        let port = authority.port_u16().unwrap_or(80);

        Ok(Self {
            address: format!("{}:{port}", authority.host()),
            authority: authority.as_str().to_string(),
            prefix: uri.path().trim_end_matches('/').to_string(),
            session_cookie,
        })
    }

    /// The `host:port` this backend connects to.
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> ClientResult<(StatusCode, Bytes)> {
        let target = format!("{}{path}", self.prefix);

        let stream = tokio::net::TcpStream::connect(&self.address)
            .await
            .map_err(|e| ClientError::Connect(format!("{}: {e}", self.address)))?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| ClientError::Connect(format!("{}: {e}", self.address)))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "backend connection closed with error");
            }
        });

        let mut builder = http::Request::builder()
            .method(method.clone())
            .uri(&target)
            .header(HOST, &self.authority)
            .header(USER_AGENT, concat!("policydesk/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json");
        if let Some(cookie) = &self.session_cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let body = match body {
            Some(bytes) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(bytes))
            }
            None => Full::new(Bytes::new()),
        };
        let req = builder
            .body(body)
            .map_err(|e| ClientError::Request(e.to_string()))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;
        let status = resp.status();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?
            .to_bytes();

        debug!(%method, path = %target, %status, len = bytes.len(), "backend responded");
        Ok((status, bytes))
    }

    async fn get_policies(&self) -> ClientResult<Vec<PolicyRecord>> {
        let (status, bytes) = self.send(Method::GET, POLICIES_PATH, None).await?;
        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }
        let envelope: PoliciesEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))?;
        envelope
            .policies
            .ok_or_else(|| missing_collection("policies", envelope.error))
    }

    async fn get_salespeople(&self) -> ClientResult<Vec<SalespersonRecord>> {
        let (status, bytes) = self.send(Method::GET, SALESPEOPLE_PATH, None).await?;
        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }
        let envelope: SalespeopleEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))?;
        envelope
            .salespeople
            .ok_or_else(|| missing_collection("salespeople", envelope.error))
    }

    async fn post_policy(&self, policy: &NewPolicy) -> ClientResult<CreateResponse> {
        let body =
            serde_json::to_vec(policy).map_err(|e| ClientError::Request(e.to_string()))?;
        let (status, bytes) = self.send(Method::POST, POLICIES_PATH, Some(body)).await?;

        match serde_json::from_slice::<CreateResponse>(&bytes) {
            Ok(mut response) => {
                // A non-2xx never counts as success, whatever the body says.
                if !status.is_success() {
                    response.success = false;
                }
                Ok(response)
            }
            Err(_) if !status.is_success() => Err(status_error(status, &bytes)),
            Err(e) => Err(ClientError::Decode(e.to_string())),
        }
    }
}

impl PolicyBackend for HttpBackend {
    fn fetch_policies(&self) -> BackendFuture<'_, Vec<PolicyRecord>> {
        Box::pin(self.get_policies())
    }

    fn fetch_salespeople(&self) -> BackendFuture<'_, Vec<SalespersonRecord>> {
        Box::pin(self.get_salespeople())
    }

    fn create_policy<'a>(&'a self, policy: &'a NewPolicy) -> BackendFuture<'a, CreateResponse> {
        Box::pin(self.post_policy(policy))
    }
}

/// Build a status error, lifting `{"error": "..."}` out of the body when present.
fn status_error(status: StatusCode, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string));
    ClientError::Status {
        status: status.as_u16(),
        message,
    }
}

/// A 2xx body without the expected collection, keeping any server error text.
fn missing_collection(field: &str, server_error: Option<String>) -> ClientError {
    match server_error {
        Some(message) => ClientError::Decode(format!("response has no {field} field: {message}")),
        None => ClientError::Decode(format!("response has no {field} field")),
    }
}
