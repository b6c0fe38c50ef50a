use serde::{Deserialize, Serialize};

/// Claims embedded in every session token issued by hostpanel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Standard JWT subject: the credential record id, opaque end-to-end.
    pub sub: String,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiry (Unix seconds). A token is invalid once this is in the past,
    /// even with a valid signature.
    pub exp: i64,

    /// Unique token id. Unused for revocation today, but guarantees two
    /// tokens issued in the same instant differ.
    pub jti: String,
}
