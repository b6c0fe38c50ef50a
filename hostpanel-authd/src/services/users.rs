//! UserService gRPC implementation: registration, login, logout, profile.
//!
//! Login failures are deliberately indistinguishable to the client: an
//! unknown username and a wrong password both surface the same generic
//! `Unauthenticated` message, so usernames cannot be enumerated. The
//! distinct cause is logged server-side.

use std::sync::Arc;

use tonic::metadata::MetadataValue;
use tonic::{Request, Response, Status};

use hostpanel_auth::password::{self, PasswordError};
use hostpanel_auth::SessionKeyring;
use hostpanel_proto::user_service_server::UserService;
use hostpanel_proto::{
    GetProfileRequest, GetProfileResponse, LoginUserRequest, LoginUserResponse,
    LogoutUserRequest, LogoutUserResponse, RegisterUserRequest, RegisterUserResponse,
};

use crate::gate::AuthenticatedUser;
use crate::store::{CredentialStore, StoreError};

/// The generic client-visible login failure. Never distinguishes unknown
/// username from wrong password.
fn invalid_credentials() -> Status {
    Status::unauthenticated("invalid username or password")
}

/// Implementation of the UserService gRPC service.
pub struct UserServiceImpl {
    store: Arc<CredentialStore>,
    sessions: Arc<SessionKeyring>,
}

impl UserServiceImpl {
    pub fn new(store: Arc<CredentialStore>, sessions: Arc<SessionKeyring>) -> Self {
        Self { store, sessions }
    }

    /// Attach a session cookie to an outgoing response.
    fn set_cookie<T>(&self, response: &mut Response<T>, value: &str, max_age: i64) -> Result<(), Status> {
        let cookie = format!("token={value}; HttpOnly; Path=/; Secure; Max-Age={max_age}");
        let cookie = MetadataValue::try_from(cookie.as_str())
            .map_err(|_| Status::internal("internal error"))?;
        response.metadata_mut().insert("set-cookie", cookie);
        Ok(())
    }
}

#[tonic::async_trait]
impl UserService for UserServiceImpl {
    async fn register_user(
        &self,
        request: Request<RegisterUserRequest>,
    ) -> Result<Response<RegisterUserResponse>, Status> {
        let req = request.into_inner();

        if req.username.is_empty() || req.email.is_empty() || req.password.is_empty() {
            return Err(Status::invalid_argument("empty fields not allowed"));
        }

        let password_hash = password::hash_password(&req.password).map_err(|e| match e {
            PasswordError::TooLong => Status::invalid_argument("password too long"),
            other => {
                tracing::error!(error = %other, "password hashing failed");
                Status::internal("internal error")
            }
        })?;

        match self
            .store
            .create(&req.username, &req.email, &password_hash)
            .await
        {
            Ok(user) => {
                tracing::info!(username = %req.username, id = %user.id, "user registered");
                Ok(Response::new(RegisterUserResponse { status: true }))
            }
            Err(StoreError::AlreadyExists) => {
                tracing::warn!(username = %req.username, "registration rejected: username taken");
                Err(Status::already_exists("user already exists, try another name"))
            }
            Err(StoreError::EmptyField) => Err(Status::invalid_argument("empty fields not allowed")),
            Err(e) => {
                tracing::error!(error = %e, "registration failed");
                Err(Status::internal("internal error"))
            }
        }
    }

    async fn login_user(
        &self,
        request: Request<LoginUserRequest>,
    ) -> Result<Response<LoginUserResponse>, Status> {
        let req = request.into_inner();

        let user = self
            .store
            .find_by_username(&req.username)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "credential lookup failed");
                Status::internal("internal error")
            })?;

        let Some(user) = user else {
            tracing::warn!(username = %req.username, "login failed: unknown username");
            return Err(invalid_credentials());
        };

        let password_ok = match password::verify_password(&req.password, &user.password_hash) {
            Ok(matched) => matched,
            // Over-long input can never match a stored hash; fold it into
            // the generic failure. An unreadable stored hash is our fault,
            // not the caller's.
            Err(PasswordError::TooLong) => false,
            Err(e) => {
                tracing::error!(username = %req.username, error = %e, "stored password hash unreadable");
                return Err(Status::internal("internal error"));
            }
        };
        if !password_ok {
            tracing::warn!(username = %req.username, "login failed: wrong password");
            return Err(invalid_credentials());
        }

        let token = self.sessions.issue(&user.id).map_err(|e| {
            tracing::error!(error = %e, "token issuance failed");
            Status::internal("internal error")
        })?;

        let mut response = Response::new(LoginUserResponse {
            token: token.clone(),
        });
        self.set_cookie(&mut response, &token, self.sessions.ttl_secs())?;

        tracing::info!(username = %req.username, subject = %user.id, "login succeeded");
        Ok(response)
    }

    async fn logout_user(
        &self,
        _request: Request<LogoutUserRequest>,
    ) -> Result<Response<LogoutUserResponse>, Status> {
        // Sessions are stateless; logout is a cookie-clearing directive.
        let mut response = Response::new(LogoutUserResponse { status: true });
        self.set_cookie(&mut response, "", 0)?;
        Ok(response)
    }

    async fn get_profile(
        &self,
        request: Request<GetProfileRequest>,
    ) -> Result<Response<GetProfileResponse>, Status> {
        // The gate verified the token and injected the subject; a missing
        // extension means the gate was bypassed, which is a deployment bug.
        let caller = request
            .extensions()
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| Status::unauthenticated("authentication required"))?;

        let user = self
            .store
            .find_by_id(&caller.id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "profile lookup failed");
                Status::internal("internal error")
            })?
            .ok_or_else(|| Status::not_found("user not found"))?;

        Ok(Response::new(GetProfileResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }))
    }
}
