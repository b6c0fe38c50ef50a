//! Pure authentication library for hostpanel.
//!
//! This crate is intentionally IO-free:
//! - No filesystem operations
//! - No network calls
//! - No database interactions
//! - No logging
//!
//! The daemon injects dependencies around it:
//! - [`session::SessionKeyring`] - stateless JWT issuance and verification
//! - [`password`] - bcrypt hashing for the credential store
//! - [`gate`] - allow-list and credential-extraction rules for the request gate
//!
//! # Example
//!
//! ```ignore
//! use hostpanel_auth::session::SessionKeyring;
//!
//! let keyring = SessionKeyring::new(&["secret".to_string()], 3600)?;
//! let token = keyring.issue("user-id")?;
//! let claims = keyring.verify(&token)?;
//! assert_eq!(claims.sub, "user-id");
//! ```

pub mod gate;
pub mod password;
pub mod session;

pub use gate::{bearer_token, cookie_token, Allowlist};
pub use password::{hash_password, verify_password, PasswordError, MAX_PASSWORD_BYTES};
pub use session::{SessionClaims, SessionError, SessionKeyring};
