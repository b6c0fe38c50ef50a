//! Request-gate rules: the allow-list of public methods and the
//! credential-extraction helpers the gate middleware runs on every call.
//!
//! Kept IO-free here; the daemon owns the tower layer that applies these
//! rules to live traffic.

/// Set of method-name suffixes exempt from authentication.
///
/// A request is public if the full gRPC method path (for example
/// `/hostpanel.auth.v1.UserService/LoginUser`) ends with any entry.
#[derive(Debug, Clone)]
pub struct Allowlist {
    suffixes: Vec<String>,
}

impl Allowlist {
    /// Build an allow-list from method-name suffixes.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `full_method` bypasses the gate.
    #[must_use]
    pub fn is_public(&self, full_method: &str) -> bool {
        self.suffixes
            .iter()
            .any(|suffix| full_method.ends_with(suffix.as_str()))
    }
}

/// Extract the token from an `authorization` header value.
///
/// Accepts `Bearer <token>` with a case-insensitive scheme. Returns `None`
/// for a missing scheme, a non-bearer scheme, or an empty token.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, value) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Extract a named cookie from a `cookie` header value.
///
/// REST-gateway calls carry the session token as a cookie rather than an
/// `authorization` header. Returns `None` if the cookie is absent or empty.
#[must_use]
pub fn cookie_token<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist_suffix_match() {
        let allowlist = Allowlist::new(["LoginUser", "RegisterUser"]);

        assert!(allowlist.is_public("/hostpanel.auth.v1.UserService/LoginUser"));
        assert!(allowlist.is_public("/hostpanel.auth.v1.UserService/RegisterUser"));
        assert!(!allowlist.is_public("/hostpanel.auth.v1.UserService/LogoutUser"));
        assert!(!allowlist.is_public("/hostpanel.auth.v1.UserService/GetProfile"));
    }

    #[test]
    fn test_empty_allowlist_protects_everything() {
        let allowlist = Allowlist::new(Vec::<String>::new());

        assert!(!allowlist.is_public("/hostpanel.auth.v1.UserService/LoginUser"));
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER abc"), Some("abc"));
    }

    #[test]
    fn test_bearer_token_rejects_malformed_headers() {
        assert_eq!(bearer_token("abc.def.ghi"), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn test_cookie_token_extraction() {
        assert_eq!(cookie_token("token=abc", "token"), Some("abc"));
        assert_eq!(
            cookie_token("theme=dark; token=abc; lang=en", "token"),
            Some("abc")
        );
    }

    #[test]
    fn test_cookie_token_missing_or_empty() {
        assert_eq!(cookie_token("theme=dark", "token"), None);
        assert_eq!(cookie_token("token=", "token"), None);
        assert_eq!(cookie_token("", "token"), None);
        // Name must match exactly; no prefix matching.
        assert_eq!(cookie_token("tokenish=abc", "token"), None);
    }
}
