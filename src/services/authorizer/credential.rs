//! Bearer credential extraction from a raw `Authorization` header value.

use super::error::AuthorizationError;

const BEARER_PREFIX: &str = "Bearer ";

/// Candidate token pulled out of the header. Never persisted or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential {
    token: String,
}

impl BearerCredential {
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print token material
        f.debug_struct("BearerCredential").finish_non_exhaustive()
    }
}

/// Trim the header and strip the case-sensitive `"Bearer "` prefix.
///
/// The remainder is returned as-is; an all-whitespace token is left for the
/// verifier to reject.
pub fn extract_bearer(header: Option<&str>) -> Result<BearerCredential, AuthorizationError> {
    let header = header.map(str::trim).unwrap_or_default();

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthorizationError::MissingCredential)?;

    Ok(BearerCredential {
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_missing(header: Option<&str>) {
        let err = extract_bearer(header).unwrap_err();
        assert!(
            matches!(err, AuthorizationError::MissingCredential),
            "header {header:?} gave {err:?}"
        );
    }

    #[test]
    fn rejects_absent_empty_and_whitespace_headers() {
        assert_missing(None);
        assert_missing(Some(""));
        assert_missing(Some("   "));
        assert_missing(Some("\t\n"));
    }

    #[test]
    fn rejects_other_schemes() {
        assert_missing(Some("Token abc"));
        assert_missing(Some("Basic dXNlcjpwYXNz"));
        assert_missing(Some("bearer abc"));
        assert_missing(Some("BEARER abc"));
        assert_missing(Some("Bearerabc"));
    }

    #[test]
    fn prefix_with_only_trailing_whitespace_is_missing() {
        // Trimming removes the space that the prefix needs.
        assert_missing(Some("Bearer"));
        assert_missing(Some("Bearer    "));
    }

    #[test]
    fn returns_token_after_prefix() {
        let cred = extract_bearer(Some("Bearer fake.token.value")).unwrap();
        assert_eq!(cred.token(), "fake.token.value");
    }

    #[test]
    fn trims_surrounding_whitespace_but_not_the_token() {
        let cred = extract_bearer(Some("  Bearer abc.def  ")).unwrap();
        assert_eq!(cred.token(), "abc.def");

        let cred = extract_bearer(Some("Bearer   abc")).unwrap();
        assert_eq!(cred.token(), "  abc");
    }

    #[test]
    fn debug_output_hides_token() {
        let cred = extract_bearer(Some("Bearer secret.value")).unwrap();
        assert!(!format!("{cred:?}").contains("secret"));
    }
}
