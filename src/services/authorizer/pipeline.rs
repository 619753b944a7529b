/*
 * Responsibility
 * - extract → verify → validate → decide の 1 リクエスト分の直列パイプライン
 * - 失敗時の原因ログ (token は出さない)
 *
 * Notes
 * - 共有するのは immutable な TrustParameters と verifier handle のみ
 * - await するのは verifier 呼び出しの 1 箇所だけ。timeout はここでは掛けない
 */
use std::sync::Arc;

use super::claims::{self, VerifiedClaims};
use super::credential::extract_bearer;
use super::decision::AuthorizationDecision;
use super::error::AuthorizationError;
use super::trust::TrustParameters;
use super::verifier::TokenVerifier;

/// One authorization request as delivered by the host.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub authorization_header: Option<String>,
    pub resource: String,
}

impl std::fmt::Debug for AuthorizationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the header (token material)
        f.debug_struct("AuthorizationRequest")
            .field("has_authorization_header", &self.authorization_header.is_some())
            .field("resource", &self.resource)
            .finish()
    }
}

#[derive(Clone)]
pub struct Authorizer {
    trust: Arc<TrustParameters>,
    verifier: Arc<dyn TokenVerifier>,
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("trust", &self.trust)
            .finish_non_exhaustive()
    }
}

impl Authorizer {
    pub fn new(trust: TrustParameters, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            trust: Arc::new(trust),
            verifier,
        }
    }

    pub fn trust(&self) -> &TrustParameters {
        &self.trust
    }

    /// Decide whether the request may invoke its resource.
    ///
    /// Failures are logged here; the returned error still carries the cause
    /// but callers must only expose `public_message()`.
    pub async fn authorize(
        &self,
        req: &AuthorizationRequest,
    ) -> Result<AuthorizationDecision, AuthorizationError> {
        match self.evaluate(req).await {
            Ok(decision) => {
                tracing::debug!(
                    principal_id = %decision.principal_id,
                    resource = %req.resource,
                    "authorization granted"
                );
                Ok(decision)
            }
            Err(err @ AuthorizationError::MissingCredential) => {
                tracing::debug!(resource = %req.resource, "no bearer token");
                Err(err)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    stage = err.stage(),
                    resource = %req.resource,
                    "token verification failed"
                );
                Err(err)
            }
        }
    }

    async fn evaluate(
        &self,
        req: &AuthorizationRequest,
    ) -> Result<AuthorizationDecision, AuthorizationError> {
        let credential = extract_bearer(req.authorization_header.as_deref())?;

        let payload = self.verifier.verify(credential.token(), &self.trust).await?;
        let verified = VerifiedClaims::from_verified(payload)?;

        let access = claims::validate(verified)?;

        Ok(AuthorizationDecision::allow(&access, &req.resource))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::services::authorizer::claims::ClaimSet;
    use crate::services::authorizer::error::{ScopeError, VerifyError};

    const ARN: &str = "arn:aws:execute-api:region:account-id:api-id/stage/method/resource-path";

    /// Returns a canned result and records every token it was asked about.
    struct FakeVerifier {
        payload: Option<Value>,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl FakeVerifier {
        fn accepting(payload: Value) -> Arc<Self> {
            Arc::new(Self {
                payload: Some(payload),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn rejecting() -> Arc<Self> {
            Arc::new(Self {
                payload: None,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenVerifier for FakeVerifier {
        async fn verify(
            &self,
            token: &str,
            _trust: &TrustParameters,
        ) -> Result<ClaimSet, VerifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(token.to_string());
            match &self.payload {
                Some(Value::Object(map)) => Ok(map.clone()),
                _ => Err(VerifyError::MalformedClaim("signature")),
            }
        }
    }

    fn authorizer(verifier: Arc<FakeVerifier>) -> Authorizer {
        let trust = TrustParameters::for_user_pool("us-west-2", "us-west-2_fakePool", 0).unwrap();
        Authorizer::new(trust, verifier)
    }

    fn request(header: Option<&str>) -> AuthorizationRequest {
        AuthorizationRequest {
            authorization_header: header.map(str::to_string),
            resource: ARN.to_string(),
        }
    }

    fn bearer() -> AuthorizationRequest {
        request(Some("Bearer fake.token.value"))
    }

    #[tokio::test]
    async fn grants_valid_access_token() {
        let verifier = FakeVerifier::accepting(json!({
            "token_use": "access",
            "sub": "abc123",
            "username": "johndoe",
            "scope": "aws.cognito.signin.user.admin other.scope",
        }));
        let decision = authorizer(verifier.clone())
            .authorize(&bearer())
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&decision).unwrap(),
            json!({
                "principalId": "abc123",
                "policyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Action": "execute-api:Invoke",
                        "Effect": "Allow",
                        "Resource": ARN,
                    }],
                },
                "context": {
                    "username": "johndoe",
                    "scope": "aws.cognito.signin.user.admin other.scope",
                },
            })
        );
        assert_eq!(*verifier.seen.lock().unwrap(), vec!["fake.token.value"]);
    }

    #[tokio::test]
    async fn uses_fallbacks_without_sub_and_username() {
        let verifier = FakeVerifier::accepting(json!({
            "token_use": "access",
            "scope": "aws.cognito.signin.user.admin",
        }));
        let decision = authorizer(verifier).authorize(&bearer()).await.unwrap();

        assert_eq!(decision.principal_id, "unknown");
        assert_eq!(decision.context.username, "unknown");
        assert_eq!(decision.context.scope, "aws.cognito.signin.user.admin");
    }

    #[tokio::test]
    async fn missing_credential_never_reaches_verifier() {
        let verifier = FakeVerifier::accepting(json!({
            "token_use": "access",
            "scope": "aws.cognito.signin.user.admin",
        }));
        let authorizer = authorizer(verifier.clone());

        for header in [None, Some(""), Some("   "), Some("Token abc"), Some("bearer x")] {
            let err = authorizer.authorize(&request(header)).await.unwrap_err();
            assert!(matches!(err, AuthorizationError::MissingCredential));
            assert_eq!(err.public_message(), "No bearer token!");
        }
        assert_eq!(verifier.calls(), 0);
    }

    #[tokio::test]
    async fn verification_failure_is_unauthorized() {
        let err = authorizer(FakeVerifier::rejecting())
            .authorize(&bearer())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthorizationError::VerificationFailed(_)));
        assert_eq!(err.public_message(), "Unauthorized");
    }

    #[tokio::test]
    async fn id_token_is_unauthorized() {
        let verifier = FakeVerifier::accepting(json!({
            "token_use": "id",
            "sub": "user123",
            "username": "testuser",
            "scope": "aws.cognito.signin.user.admin",
        }));
        let err = authorizer(verifier).authorize(&bearer()).await.unwrap_err();

        assert!(matches!(err, AuthorizationError::WrongTokenType(_)));
        assert_eq!(err.public_message(), "Unauthorized");
    }

    #[tokio::test]
    async fn missing_scope_is_unauthorized() {
        let verifier = FakeVerifier::accepting(json!({
            "token_use": "access",
            "sub": "user123",
            "username": "testuser",
        }));
        let err = authorizer(verifier).authorize(&bearer()).await.unwrap_err();

        assert!(matches!(
            err,
            AuthorizationError::InsufficientScope(ScopeError::Missing)
        ));
        assert_eq!(err.public_message(), "Unauthorized");
    }

    #[tokio::test]
    async fn scope_without_admin_is_unauthorized() {
        let verifier = FakeVerifier::accepting(json!({
            "token_use": "access",
            "sub": "user123",
            "username": "testuser",
            "scope": "read write",
        }));
        let err = authorizer(verifier).authorize(&bearer()).await.unwrap_err();

        assert!(matches!(
            err,
            AuthorizationError::InsufficientScope(ScopeError::NotGranted(_))
        ));
        assert_eq!(err.public_message(), "Unauthorized");
    }

    #[tokio::test]
    async fn malformed_sub_is_verification_failure() {
        let verifier = FakeVerifier::accepting(json!({
            "token_use": "access",
            "sub": ["a", "b"],
            "scope": "aws.cognito.signin.user.admin",
        }));
        let err = authorizer(verifier).authorize(&bearer()).await.unwrap_err();

        assert!(matches!(
            err,
            AuthorizationError::VerificationFailed(VerifyError::MalformedClaim("sub"))
        ));
    }

    #[tokio::test]
    async fn repeated_requests_give_the_same_decision() {
        let verifier = FakeVerifier::accepting(json!({
            "token_use": "access",
            "sub": "abc123",
            "scope": "aws.cognito.signin.user.admin",
        }));
        let authorizer = authorizer(verifier.clone());

        let first = authorizer.authorize(&bearer()).await.unwrap();
        let second = authorizer.authorize(&bearer()).await.unwrap();

        assert_eq!(first, second);
        // Every evaluation re-verifies.
        assert_eq!(verifier.calls(), 2);
    }

    #[tokio::test]
    async fn concurrent_requests_are_independent() {
        let verifier = FakeVerifier::accepting(json!({
            "token_use": "access",
            "sub": "abc123",
            "scope": "aws.cognito.signin.user.admin",
        }));
        let authorizer = authorizer(verifier.clone());

        let mut handles = Vec::new();
        for i in 0..16 {
            let authorizer = authorizer.clone();
            handles.push(tokio::spawn(async move {
                let req = AuthorizationRequest {
                    authorization_header: Some("Bearer fake.token.value".into()),
                    resource: format!("arn:aws:execute-api:r:a:api/stage/GET/item/{i}"),
                };
                (i, authorizer.authorize(&req).await)
            }));
        }

        for handle in handles {
            let (i, result) = handle.await.unwrap();
            let decision = result.unwrap();
            assert_eq!(
                decision.policy_document.statement[0].resource,
                format!("arn:aws:execute-api:r:a:api/stage/GET/item/{i}")
            );
        }
        assert_eq!(verifier.calls(), 16);
    }

    #[test]
    fn request_debug_hides_header() {
        let req = request(Some("Bearer secret.token"));
        assert!(!format!("{req:?}").contains("secret"));
    }
}
