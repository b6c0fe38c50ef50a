//! Session error types.

/// Errors that can occur when issuing or verifying session tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SessionError {
    /// No signing keys were configured.
    #[error("no signing keys configured")]
    NoKeys,

    /// Signing the token failed.
    #[error("token signing failed")]
    Signing,

    /// The signature does not match any configured verification key.
    #[error("invalid signature")]
    InvalidSignature,

    /// The token's expiry is in the past.
    #[error("token expired")]
    Expired,

    /// The token is structurally invalid, or declares an unexpected
    /// signing algorithm.
    #[error("malformed token")]
    Malformed,
}
