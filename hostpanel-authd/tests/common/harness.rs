//! Test harness for auth E2E tests.
//!
//! Uses tonic's pattern of passing the server directly to the client (no
//! network), plus a raw HTTP path through the session gate layer for the
//! middleware tests.

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use sqlx::SqlitePool;
use tower::Layer;

use hostpanel_auth::{Allowlist, SessionKeyring};
use hostpanel_proto::user_service_client::UserServiceClient;
use hostpanel_proto::user_service_server::UserServiceServer;

use hostpanel_authd::gate::{RequestGate, SessionGateLayer, SessionGateService};
use hostpanel_authd::services::{AuthRateLimiter, UserServiceImpl};
use hostpanel_authd::store::CredentialStore;

/// Symmetric secret shared by every test daemon.
pub const TEST_SECRET: &str = "e2e-test-session-secret";

/// Test daemon that uses direct service-to-client communication (no network).
pub struct TestDaemon {
    pub store: Arc<CredentialStore>,
    pub sessions: Arc<SessionKeyring>,
}

impl TestDaemon {
    /// Create a test daemon backed by in-memory SQLite and [`TEST_SECRET`].
    pub async fn new() -> Self {
        Self::with_keyring(
            SessionKeyring::new(&[TEST_SECRET], 3600).expect("Failed to build keyring"),
        )
        .await
    }

    /// Create a test daemon with a specific keyring (rotation and
    /// expired-token scenarios).
    pub async fn with_keyring(sessions: SessionKeyring) -> Self {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        let store = CredentialStore::new(pool)
            .await
            .expect("Failed to initialize store");

        Self {
            store: Arc::new(store),
            sessions: Arc::new(sessions),
        }
    }

    /// A gRPC client wired straight to the service, bypassing the gate.
    pub fn client(&self) -> UserServiceClient<UserServiceServer<UserServiceImpl>> {
        UserServiceClient::new(UserServiceServer::new(self.service()))
    }

    /// The service stack as the daemon runs it: gate layer in front of the
    /// gRPC server. Drive it with [`grpc_request`] and `tower::ServiceExt`.
    /// The limiter is generous so unrelated tests never trip it.
    pub fn gated_service(&self) -> SessionGateService<UserServiceServer<UserServiceImpl>> {
        self.gated_service_with_limiter(AuthRateLimiter::new(100, 100))
    }

    /// Same stack with a caller-chosen rate limiter.
    #[allow(dead_code)]
    pub fn gated_service_with_limiter(
        &self,
        limiter: AuthRateLimiter,
    ) -> SessionGateService<UserServiceServer<UserServiceImpl>> {
        let allowlist = Arc::new(Allowlist::new(["LoginUser", "RegisterUser"]));
        let gate = RequestGate::new(allowlist, self.sessions.clone(), limiter);
        SessionGateLayer::new(gate).layer(UserServiceServer::new(self.service()))
    }

    fn service(&self) -> UserServiceImpl {
        UserServiceImpl::new(self.store.clone(), self.sessions.clone())
    }
}

/// Build a raw gRPC-over-HTTP/2 request carrying an empty message.
///
/// Every request message exercised through the gate encodes to zero bytes,
/// so the body is just the five-byte gRPC frame header (uncompressed,
/// length 0).
#[allow(dead_code)]
pub fn grpc_request(path: &str) -> http::Request<Full<Bytes>> {
    http::Request::builder()
        .method(http::Method::POST)
        .uri(path)
        .header(http::header::CONTENT_TYPE, "application/grpc")
        .header("te", "trailers")
        .body(Full::new(Bytes::from_static(&[0, 0, 0, 0, 0])))
        .expect("Failed to build request")
}
