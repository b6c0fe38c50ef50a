//! Stateless session tokens.
//!
//! Sessions are compact signed JWTs (HS256) carrying:
//! - `sub`: the credential record id, treated as an opaque string
//! - `iat` / `exp`: issuance and expiry timestamps (Unix seconds)
//! - `jti`: a fresh random id so two tokens issued in the same second
//!   for the same subject are still distinct strings
//!
//! Validity is purely a function of signature and expiry at verification
//! time; nothing is stored server-side. The signing secret is shared by all
//! verifying instances, and rotation is supported by verifying against an
//! ordered list of keys while signing with only the newest.

mod claims;
mod error;
mod keyring;

pub use claims::SessionClaims;
pub use error::SessionError;
pub use keyring::SessionKeyring;
