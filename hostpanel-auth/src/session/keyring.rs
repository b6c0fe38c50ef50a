use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::{SessionClaims, SessionError};

/// The only accepted signing algorithm. Tokens declaring anything else are
/// rejected before signature verification (algorithm-confusion defense).
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and verifies session tokens.
///
/// Holds an ordered list of symmetric keys, newest first. Signing always
/// uses the newest key; verification accepts any key in the list, so a key
/// can be rotated in without invalidating sessions signed by its
/// predecessor. Rotating a key out invalidates all sessions signed with it.
pub struct SessionKeyring {
    signing: EncodingKey,
    verification: Vec<DecodingKey>,
    ttl_secs: i64,
    validation: Validation,
}

impl SessionKeyring {
    /// Build a keyring from raw secrets, newest first.
    ///
    /// # Errors
    /// Returns [`SessionError::NoKeys`] if `secrets` is empty.
    pub fn new<S: AsRef<[u8]>>(secrets: &[S], ttl_secs: i64) -> Result<Self, SessionError> {
        let newest = secrets.first().ok_or(SessionError::NoKeys)?;

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry checks must be exact: a token one second past its expiry
        // is expired, not "close enough".
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            signing: EncodingKey::from_secret(newest.as_ref()),
            verification: secrets
                .iter()
                .map(|s| DecodingKey::from_secret(s.as_ref()))
                .collect(),
            ttl_secs,
            validation,
        })
    }

    /// The configured session lifetime in seconds.
    #[must_use]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a signed session token for `subject`.
    ///
    /// Two consecutive calls never produce identical strings: each token
    /// carries a fresh random `jti`.
    ///
    /// # Errors
    /// Returns [`SessionError::Signing`] if signing fails; this is fatal to
    /// the login attempt only.
    pub fn issue(&self, subject: &str) -> Result<String, SessionError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
            jti: Uuid::new_v4().to_string(),
        };

        jsonwebtoken::encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.signing)
            .map_err(|_| SessionError::Signing)
    }

    /// Verify a token and recover its claims.
    ///
    /// A token is valid iff its signature matches one of the configured
    /// keys and its expiry is in the future.
    ///
    /// # Errors
    /// - [`SessionError::InvalidSignature`] if no configured key matches
    /// - [`SessionError::Expired`] if the signature is valid but `exp` has
    ///   passed
    /// - [`SessionError::Malformed`] for structurally invalid tokens or an
    ///   unexpected algorithm in the header
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        for key in &self.verification {
            match jsonwebtoken::decode::<SessionClaims>(token, key, &self.validation) {
                Ok(data) => return Ok(data.claims),
                // A signature mismatch may just mean the token was signed
                // with an older key; keep trying the rest of the list.
                Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => continue,
                Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                    return Err(SessionError::Expired)
                }
                Err(_) => return Err(SessionError::Malformed),
            }
        }
        Err(SessionError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyring(secrets: &[&str], ttl_secs: i64) -> SessionKeyring {
        SessionKeyring::new(secrets, ttl_secs).expect("keyring")
    }

    #[test]
    fn test_issue_then_verify_recovers_subject() {
        let keys = keyring(&["secret-a"], 3600);

        let token = keys.issue("user-42").unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_consecutive_tokens_are_distinct() {
        let keys = keyring(&["secret-a"], 3600);

        let first = keys.issue("user-42").unwrap();
        let second = keys.issue("user-42").unwrap();

        assert_ne!(first, second, "jti must make same-instant tokens distinct");
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative TTL produces a token whose expiry is already in the past,
        // signed with the same key the verifier trusts.
        let expired = keyring(&["secret-a"], -60);
        let fresh = keyring(&["secret-a"], 3600);

        let token = expired.issue("user-42").unwrap();

        assert_eq!(fresh.verify(&token), Err(SessionError::Expired));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let signer = keyring(&["secret-a"], 3600);
        let verifier = keyring(&["secret-b"], 3600);

        let token = signer.issue("user-42").unwrap();

        assert_eq!(verifier.verify(&token), Err(SessionError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let keys = keyring(&["secret-a"], 3600);
        let token = keys.issue("user-42").unwrap();

        // Splice the signature of a genuine token onto a payload claiming a
        // different subject. Structure is valid; only the signature fails.
        let other = keys.issue("user-43").unwrap();
        let payload = other.split('.').nth(1).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = payload;
        let forged = parts.join(".");

        assert_eq!(keys.verify(&forged), Err(SessionError::InvalidSignature));
    }

    #[test]
    fn test_unexpected_algorithm_rejected() {
        let keys = keyring(&["secret-a"], 3600);

        // Same secret, different declared algorithm.
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "user-42".to_string(),
            iat: now,
            exp: now + 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let confused = jsonwebtoken::encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"secret-a"),
        )
        .unwrap();

        assert_eq!(keys.verify(&confused), Err(SessionError::Malformed));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let keys = keyring(&["secret-a"], 3600);

        assert_eq!(keys.verify("not-a-jwt"), Err(SessionError::Malformed));
        assert_eq!(keys.verify(""), Err(SessionError::Malformed));
    }

    #[test]
    fn test_rotation_verifies_tokens_from_older_key() {
        let old = keyring(&["old-secret"], 3600);
        let rotated = keyring(&["new-secret", "old-secret"], 3600);

        let old_token = old.issue("user-42").unwrap();
        let new_token = rotated.issue("user-42").unwrap();

        // Both generations verify against the rotated keyring.
        assert_eq!(rotated.verify(&old_token).unwrap().sub, "user-42");
        assert_eq!(rotated.verify(&new_token).unwrap().sub, "user-42");

        // New tokens are signed with the newest key only.
        assert_eq!(old.verify(&new_token), Err(SessionError::InvalidSignature));
    }

    #[test]
    fn test_empty_keyring_rejected() {
        let none: &[&str] = &[];
        assert!(matches!(
            SessionKeyring::new(none, 3600),
            Err(SessionError::NoKeys)
        ));
    }
}
