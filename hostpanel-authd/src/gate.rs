//! Request gate: per-call authentication enforcement.
//!
//! Implemented as a tower layer in front of the tonic router rather than a
//! tonic interceptor, because the gate needs the full method path for its
//! allow-list and interceptors never see it. gRPC metadata travels as
//! HTTP/2 headers, so one extraction path covers both native gRPC calls
//! (`authorization: Bearer <token>`) and REST-gateway calls (`token`
//! cookie).
//!
//! On success the recovered subject is inserted into the request extensions
//! as [`AuthenticatedUser`]; tonic copies extensions into the handler's
//! `Request`, so downstream code reads a typed identity instead of
//! re-parsing the token.

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use http::{HeaderMap, HeaderValue, Request, Response};
use http_body_util::BodyExt;
use tonic::transport::server::TcpConnectInfo;
use tower::{Layer, Service};

use hostpanel_auth::{bearer_token, cookie_token, Allowlist, SessionError, SessionKeyring};

use crate::services::AuthRateLimiter;

/// Cookie carrying the session token on REST-gateway calls.
const TOKEN_COOKIE: &str = "token";

/// Identity of the authenticated caller, recovered from the session token.
///
/// Inserted into request extensions by the gate; handlers scope all data
/// access to this id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
}

/// The gate's decision for one incoming call.
enum GateDecision {
    /// Allow-listed method; no auth performed.
    Public,
    /// Verified token; carry the subject id forward.
    Authorized(String),
    /// Rejected. `reason` is logged server-side; `message` is all the
    /// client sees.
    Denied {
        reason: &'static str,
        message: &'static str,
    },
}

/// Per-request decision logic, shared by the layer and its tests.
///
/// Also owns the rate limiter for the public surface: allow-listed
/// methods accept unauthenticated traffic, so they are the ones that
/// need brute-force throttling. Protected methods are not limited here.
#[derive(Clone)]
pub struct RequestGate {
    allowlist: Arc<Allowlist>,
    sessions: Arc<SessionKeyring>,
    limiter: AuthRateLimiter,
}

impl RequestGate {
    pub fn new(
        allowlist: Arc<Allowlist>,
        sessions: Arc<SessionKeyring>,
        limiter: AuthRateLimiter,
    ) -> Self {
        Self {
            allowlist,
            sessions,
            limiter,
        }
    }

    fn decide(&self, path: &str, headers: &HeaderMap) -> GateDecision {
        if self.allowlist.is_public(path) {
            return GateDecision::Public;
        }

        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .or_else(|| {
                headers
                    .get(COOKIE)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|cookies| cookie_token(cookies, TOKEN_COOKIE))
            });

        let Some(token) = token else {
            return GateDecision::Denied {
                reason: "missing or empty token",
                message: "missing token",
            };
        };

        match self.sessions.verify(token) {
            Ok(claims) => GateDecision::Authorized(claims.sub),
            Err(e) => GateDecision::Denied {
                // The specific failure is for the server log only; the
                // client always gets the same generic message.
                reason: match e {
                    SessionError::InvalidSignature => "invalid signature",
                    SessionError::Expired => "token expired",
                    _ => "malformed token",
                },
                message: "invalid token",
            },
        }
    }
}

/// Tower layer applying the [`RequestGate`] to every call.
#[derive(Clone)]
pub struct SessionGateLayer {
    gate: RequestGate,
}

impl SessionGateLayer {
    pub fn new(gate: RequestGate) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for SessionGateLayer {
    type Service = SessionGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionGateService {
            inner,
            gate: self.gate.clone(),
        }
    }
}

/// Middleware service produced by [`SessionGateLayer`].
#[derive(Clone)]
pub struct SessionGateService<S> {
    inner: S,
    gate: RequestGate,
}

impl<S, ReqBody> Service<Request<ReqBody>> for SessionGateService<S>
where
    S: Service<Request<ReqBody>, Response = Response<tonic::body::BoxBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let path = req.uri().path().to_owned();

        match self.gate.decide(&path, req.headers()) {
            GateDecision::Public => {
                // The public surface is where credential brute-forcing
                // lands; throttle it per peer before it reaches a handler.
                let peer = client_ip(&req);
                if !self.gate.limiter.allow(peer) {
                    tracing::warn!(method = %path, %peer, "request throttled");
                    let response = grpc_error_response("8", "too many requests, slow down");
                    return Box::pin(std::future::ready(Ok(response)));
                }
                tracing::debug!(method = %path, "public method, gate bypassed");
                Box::pin(self.inner.call(req))
            }
            GateDecision::Authorized(subject) => {
                tracing::info!(method = %path, subject = %subject, "request authenticated");
                req.extensions_mut()
                    .insert(AuthenticatedUser { id: subject });
                Box::pin(self.inner.call(req))
            }
            GateDecision::Denied { reason, message } => {
                tracing::warn!(method = %path, reason, "request rejected");
                let response = unauthenticated_response(message);
                Box::pin(std::future::ready(Ok(response)))
            }
        }
    }
}

/// The peer address a request arrived from.
///
/// Requests without transport connect info (in-process callers) share one
/// unspecified-address bucket.
fn client_ip<B>(req: &Request<B>) -> IpAddr {
    req.extensions()
        .get::<TcpConnectInfo>()
        .and_then(|info| info.remote_addr())
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Build a trailers-only gRPC response carrying `Unauthenticated`.
///
/// The call never reaches the wrapped handler, so the status goes out as
/// headers on an empty-body response, which is the gRPC wire encoding for
/// an immediate error.
fn unauthenticated_response(message: &'static str) -> Response<tonic::body::BoxBody> {
    // tonic::Code::Unauthenticated
    grpc_error_response("16", message)
}

fn grpc_error_response(
    code: &'static str,
    message: &'static str,
) -> Response<tonic::body::BoxBody> {
    let mut response = Response::new(empty_body());
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/grpc"));
    headers.insert("grpc-status", HeaderValue::from_static(code));
    headers.insert("grpc-message", HeaderValue::from_static(message));
    response
}

fn empty_body() -> tonic::body::BoxBody {
    http_body_util::Empty::<Bytes>::new()
        .map_err(|err: std::convert::Infallible| -> tonic::Status { match err {} })
        .boxed_unsync()
}
