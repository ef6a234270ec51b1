#![warn(missing_docs)]
//! # devdesk-gateway
//!
//! ## Purpose
//! Single egress point for every backend call made by the `devdesk` client.
//!
//! ## Responsibilities
//! - Attach the bearer credential to outbound requests when one is held.
//! - Unwrap the transport layer into typed [`ApiEnvelope`] values.
//! - Classify transport failures and publish exactly one notice per failure.
//! - Invalidate the session and signal a login redirect on 401 responses.
//!
//! ## Data flow
//! Callers build an [`OutboundRequest`] -> [`ApiGateway::execute`] attaches
//! headers and dispatches through [`HttpTransport`] -> the reply is either
//! unwrapped into an envelope or classified into [`GatewayError`], with side
//! effects routed through [`NoticeSink`] and [`Navigator`].
//!
//! ## Ownership and lifetimes
//! The gateway owns `Arc` handles to its transport and side-channels and a
//! clone of the shared session context; it is cheap to clone per API module.
//!
//! ## Error model
//! Every failure branch publishes a notice and then returns the classified
//! [`GatewayError`] to the caller, so call sites keep local recovery options.
//!
//! ## Security and privacy notes
//! The credential is written only into the `Authorization` header; it is
//! never logged or included in notice text.

use std::sync::Arc;

use devdesk_core::{ApiEnvelope, Notice};
use devdesk_session::SessionContext;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

/// Header carrying the bearer credential.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Header carrying the per-request trace identifier.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// HTTP method subset used by the backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Idempotent read.
    Get,
    /// Create or command.
    Post,
    /// Full update.
    Put,
    /// Removal.
    Delete,
}

impl Method {
    /// Returns the wire method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// One outbound backend request before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// HTTP method.
    pub method: Method,
    /// Endpoint path joined onto the gateway base URL.
    pub path: String,
    /// JSON body, absent for body-less methods.
    pub body: Option<String>,
    /// Headers attached so far; the gateway appends auth and trace headers.
    pub headers: Vec<(String, String)>,
}

impl OutboundRequest {
    /// Creates a body-less request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Returns the header value for `name`, if attached.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Transport reply with a received status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl TransportReply {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure without a usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFault {
    /// Request was dispatched but no response arrived.
    Unreachable(String),
    /// Request could not be constructed or dispatched at all.
    InvalidRequest(String),
}

/// Abstract transport executing outbound requests.
///
/// The gateway never performs I/O itself; concrete transports and test stubs
/// plug in behind this seam.
pub trait HttpTransport: Send + Sync {
    /// Dispatches one request and returns the raw reply.
    ///
    /// # Errors
    /// Returns [`TransportFault`] when no response was received or the
    /// request never left the process.
    fn execute(&self, request: &OutboundRequest) -> Result<TransportReply, TransportFault>;
}

/// Receiver for user-visible notices emitted by failure classification.
pub trait NoticeSink: Send + Sync {
    /// Publishes one notice.
    fn publish(&self, notice: Notice);
}

/// Navigation side-channel consulted on forced logout.
///
/// Keeps the gateway independent of the router runtime: the gateway only
/// reads the current path and fires a redirect signal.
pub trait Navigator: Send + Sync {
    /// Returns the current navigation path.
    fn current_path(&self) -> String;

    /// Requests a fire-and-forget redirect to `path`.
    fn redirect(&self, path: &str);
}

/// Gateway configuration and shared handles.
#[derive(Clone)]
pub struct ApiGateway {
    base: Url,
    login_path: String,
    transport: Arc<dyn HttpTransport>,
    session: SessionContext,
    notices: Arc<dyn NoticeSink>,
    navigator: Arc<dyn Navigator>,
}

impl ApiGateway {
    /// Creates a gateway rooted at `base_url`.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] when the base URL is not absolute
    /// http(s).
    pub fn new(
        base_url: &str,
        transport: Arc<dyn HttpTransport>,
        session: SessionContext,
        notices: Arc<dyn NoticeSink>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, GatewayError> {
        let base = Url::parse(base_url)
            .map_err(|error| GatewayError::Config(format!("invalid base url: {error}")))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(GatewayError::Config(
                "base url must use http or https".to_string(),
            ));
        }

        Ok(Self {
            base,
            login_path: "/login".to_string(),
            transport,
            session,
            notices,
            navigator,
        })
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Executes a GET request against an endpoint path.
    ///
    /// # Errors
    /// See [`ApiGateway::execute`].
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>, GatewayError> {
        self.execute(OutboundRequest::new(Method::Get, path))
    }

    /// Executes a POST request with a JSON body.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] when the body cannot be serialized;
    /// otherwise see [`ApiGateway::execute`].
    pub fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<ApiEnvelope<T>, GatewayError> {
        let mut request = OutboundRequest::new(Method::Post, path);
        request.body = Some(serde_json::to_string(body).map_err(|error| {
            let classified = GatewayError::Config(format!("body serialization failed: {error}"));
            self.notices.publish(Notice::error(format!(
                "Request configuration error: {error}"
            )));
            classified
        })?);
        request
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        self.execute(request)
    }

    /// Dispatches one request through the transport and unwraps the reply.
    ///
    /// Request phase: attaches `Authorization: Bearer <credential>` when the
    /// store holds a non-empty credential, plus a random request id.
    ///
    /// # Errors
    /// Returns the classified [`GatewayError`] after the notice side effect;
    /// a 401 additionally invalidates the session and signals a redirect to
    /// the login surface unless navigation is already there.
    pub fn execute<T: DeserializeOwned>(
        &self,
        mut request: OutboundRequest,
    ) -> Result<ApiEnvelope<T>, GatewayError> {
        if let Some(credential) = self.session.credential() {
            request.headers.push((
                AUTHORIZATION_HEADER.to_string(),
                format!("Bearer {credential}"),
            ));
        }
        request
            .headers
            .push((REQUEST_ID_HEADER.to_string(), next_request_id()));

        match self.transport.execute(&request) {
            Ok(reply) if reply.is_success() => {
                ApiEnvelope::from_json_bytes(&reply.body).map_err(GatewayError::Decode)
            }
            Ok(reply) => Err(self.classify_status(&reply)),
            Err(fault) => Err(self.classify_fault(fault)),
        }
    }

    fn classify_status(&self, reply: &TransportReply) -> GatewayError {
        match reply.status {
            401 => {
                // Invalidation must be visible to every in-flight request
                // before the notice or redirect fires.
                self.session.logout();
                self.notices
                    .publish(Notice::error("Login expired, please sign in again"));
                if self.navigator.current_path() != self.login_path {
                    self.navigator.redirect(&self.login_path);
                }
                GatewayError::Unauthorized
            }
            403 => {
                self.notices.publish(Notice::error(
                    "Insufficient permissions to access this resource",
                ));
                GatewayError::Forbidden
            }
            404 => {
                self.notices
                    .publish(Notice::error("The requested resource does not exist"));
                GatewayError::NotFound
            }
            status @ 500..=599 => {
                self.notices.publish(Notice::error("Internal server error"));
                GatewayError::Server(status)
            }
            status => {
                let message = envelope_message(&reply.body)
                    .unwrap_or_else(|| "unknown error".to_string());
                self.notices
                    .publish(Notice::error(format!("Request failed: {message}")));
                GatewayError::Rejected { status, message }
            }
        }
    }

    fn classify_fault(&self, fault: TransportFault) -> GatewayError {
        match fault {
            TransportFault::Unreachable(detail) => {
                self.notices.publish(Notice::error(
                    "Network error, please check your connection",
                ));
                GatewayError::Network(detail)
            }
            TransportFault::InvalidRequest(detail) => {
                self.notices.publish(Notice::error(format!(
                    "Request configuration error: {detail}"
                )));
                GatewayError::Config(detail)
            }
        }
    }
}

/// Extracts the envelope `msg` field from a raw error body, if present.
fn envelope_message(body: &[u8]) -> Option<String> {
    ApiEnvelope::<serde_json::Value>::from_json_bytes(body)
        .ok()
        .map(|envelope| envelope.message)
        .filter(|message| !message.is_empty())
}

fn next_request_id() -> String {
    let mut bytes = [0_u8; 8];
    StdRng::from_os_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Classified gateway failures, re-raised to call sites after notification.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 401: session invalidated and login redirect signaled.
    #[error("unauthorized; session invalidated")]
    Unauthorized,
    /// 403: surfaced only, session untouched.
    #[error("forbidden")]
    Forbidden,
    /// 404: surfaced only.
    #[error("resource not found")]
    NotFound,
    /// 5xx: surfaced only.
    #[error("server error (status {0})")]
    Server(u16),
    /// Any other error status, carrying the backend message when present.
    #[error("request failed (status {status}): {message}")]
    Rejected {
        /// Transport status code.
        status: u16,
        /// Backend envelope message or a fallback.
        message: String,
    },
    /// Dispatched but no response received.
    #[error("network unreachable: {0}")]
    Network(String),
    /// Request never left the process.
    #[error("request configuration error: {0}")]
    Config(String),
    /// 2xx reply whose body is not a valid envelope.
    #[error(transparent)]
    Decode(devdesk_core::CoreError),
}

/// Recovery category for one classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Worth retrying: the condition is plausibly transient.
    Retriable,
    /// Retrying cannot help without caller-side changes.
    Permanent,
}

/// Classifies a gateway error for call-site retry decisions.
pub fn classify_gateway_error(error: &GatewayError) -> FailureClass {
    match error {
        GatewayError::Network(_) | GatewayError::Server(_) => FailureClass::Retriable,
        _ => FailureClass::Permanent,
    }
}
