use log::{error, info, warn};
use std::sync::Arc;

use crate::models::auth_outcome::{AuthErrorCode, AuthOutcome};
use crate::models::identity::{AssertionRejection, IdentityAssertion, IdentityClaims, UserInfo};
use crate::services::auth::identity_verifier::{IdentityVerifier, VerificationError};
use crate::services::auth::jwt::SessionTokenIssuer;

/// Exchanges identity-provider tokens for session tokens.
///
/// Owns input validation, claim mapping and the translation of typed failures
/// into client-facing error codes. All I/O is delegated to the verifier.
#[derive(Clone)]
pub struct AuthenticationService {
    verifier: Arc<dyn IdentityVerifier>,
    issuer: Arc<SessionTokenIssuer>,
    max_assertion_length: usize,
}

impl AuthenticationService {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        issuer: Arc<SessionTokenIssuer>,
        max_assertion_length: usize,
    ) -> Self {
        Self {
            verifier,
            issuer,
            max_assertion_length,
        }
    }

    pub fn expires_in_seconds(&self) -> i64 {
        self.issuer.expires_in_seconds()
    }

    pub async fn authenticate(&self, raw_assertion: &str) -> AuthOutcome {
        let assertion = match IdentityAssertion::parse(raw_assertion, self.max_assertion_length) {
            Ok(assertion) => assertion,
            Err(rejection) => {
                warn!("Rejected token exchange request: {}", rejection);
                return Self::rejection_outcome(rejection);
            }
        };

        info!("Verifying Firebase ID token...");
        let claims = match self.verifier.verify(&assertion).await {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Firebase token verification failed: {}", e);
                return Self::verification_outcome(e);
            }
        };
        info!("Firebase token verified successfully for user: {}", claims.subject);

        let user = Self::map_identity(claims);

        match self.issuer.issue(&user.uid, user.email.as_deref(), user.display_name.as_deref()) {
            Ok(token) => {
                info!("Session token generated successfully for user: {}", user.uid);
                AuthOutcome::success(token, user, self.issuer.expires_in_seconds())
            }
            Err(e) => {
                error!("Failed to issue session token for user {}: {}", user.uid, e);
                AuthOutcome::failure(AuthErrorCode::InternalError, "Failed to issue session token")
            }
        }
    }

    fn map_identity(claims: IdentityClaims) -> UserInfo {
        UserInfo {
            uid: claims.subject,
            email: claims.email,
            display_name: claims.display_name,
            photo_url: claims.photo_url,
            email_verified: claims.email_verified,
        }
    }

    fn rejection_outcome(rejection: AssertionRejection) -> AuthOutcome {
        AuthOutcome::failure(AuthErrorCode::InvalidRequest, rejection.to_string())
    }

    // Provider-supplied text is passed through for rejections only; transport
    // and internal error text stays in the logs.
    fn verification_outcome(error: VerificationError) -> AuthOutcome {
        match error {
            VerificationError::InvalidAssertion(message) => AuthOutcome::failure(
                AuthErrorCode::InvalidToken,
                format!("Invalid Firebase ID token: {}", message),
            ),
            VerificationError::ProviderUnavailable(_) => AuthOutcome::failure(
                AuthErrorCode::VerificationFailed,
                "Token verification failed: identity provider unavailable",
            ),
            VerificationError::Unexpected(_) => AuthOutcome::failure(
                AuthErrorCode::VerificationFailed,
                "Token verification failed",
            ),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) const TEST_SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    /// Verifier returning a canned result and counting calls
    pub(crate) struct StubVerifier {
        result: Result<IdentityClaims, VerificationError>,
        calls: AtomicUsize,
    }

    impl StubVerifier {
        pub(crate) fn returning(result: Result<IdentityClaims, VerificationError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IdentityVerifier for StubVerifier {
        async fn verify(&self, _assertion: &IdentityAssertion) -> Result<IdentityClaims, VerificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    pub(crate) fn claims_u1() -> IdentityClaims {
        IdentityClaims {
            subject: "u1".to_string(),
            email: Some("a@b.com".to_string()),
            email_verified: false,
            display_name: Some("A".to_string()),
            photo_url: None,
        }
    }

    pub(crate) fn issuer(expiration_secs: i64) -> Arc<SessionTokenIssuer> {
        Arc::new(SessionTokenIssuer::new(TEST_SECRET, expiration_secs).unwrap())
    }

    fn service_with(stub: Arc<StubVerifier>, issuer: Arc<SessionTokenIssuer>) -> AuthenticationService {
        AuthenticationService::new(stub, issuer, 5000)
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let stub = StubVerifier::returning(Ok(claims_u1()));
        let issuer = issuer(3600);
        let service = service_with(stub.clone(), issuer.clone());

        let outcome = service.authenticate("valid-token-abc").await;

        match outcome {
            AuthOutcome::Success { token, user, expires_in } => {
                assert_eq!(expires_in, 3600);
                assert_eq!(
                    user,
                    UserInfo {
                        uid: "u1".to_string(),
                        email: Some("a@b.com".to_string()),
                        display_name: Some("A".to_string()),
                        photo_url: None,
                        email_verified: false,
                    }
                );
                assert_eq!(issuer.decode_subject(&token).unwrap(), "u1");
                assert!(issuer.validate(&token, "u1"));
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_assertion_maps_to_invalid_token() {
        let stub = StubVerifier::returning(Err(VerificationError::InvalidAssertion("expired".to_string())));
        let service = service_with(stub, issuer(3600));

        let outcome = service.authenticate("garbage").await;

        assert_eq!(outcome.error_code(), Some(AuthErrorCode::InvalidToken));
        if let AuthOutcome::Failure { message, .. } = outcome {
            assert!(message.contains("expired"));
        }
    }

    #[tokio::test]
    async fn test_provider_timeout_maps_to_verification_failed() {
        let stub = StubVerifier::returning(Err(VerificationError::ProviderUnavailable(
            "operation timed out after 10s connecting to 10.0.0.7".to_string(),
        )));
        let service = service_with(stub, issuer(3600));

        let outcome = service.authenticate("valid-token-abc").await;

        assert_eq!(outcome.error_code(), Some(AuthErrorCode::VerificationFailed));
        if let AuthOutcome::Failure { message, .. } = outcome {
            assert!(!message.contains("10.0.0.7"));
        }
    }

    #[tokio::test]
    async fn test_unexpected_error_maps_to_verification_failed() {
        let stub = StubVerifier::returning(Err(VerificationError::Unexpected("boom".to_string())));
        let service = service_with(stub, issuer(3600));

        let outcome = service.authenticate("valid-token-abc").await;

        assert_eq!(outcome.error_code(), Some(AuthErrorCode::VerificationFailed));
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_verifier() {
        let stub = StubVerifier::returning(Ok(claims_u1()));
        let service = AuthenticationService::new(stub.clone(), issuer(3600), 16);

        for raw in ["", "   ", "\n\t", "this-token-is-way-too-long"] {
            let outcome = service.authenticate(raw).await;
            assert_eq!(outcome.error_code(), Some(AuthErrorCode::InvalidRequest), "input {:?}", raw);
        }
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_optional_claims_stay_absent() {
        let stub = StubVerifier::returning(Ok(IdentityClaims {
            subject: "anon".to_string(),
            email: None,
            email_verified: false,
            display_name: None,
            photo_url: None,
        }));
        let service = service_with(stub, issuer(60));

        match service.authenticate("anonymous-token").await {
            AuthOutcome::Success { user, expires_in, .. } => {
                assert_eq!(user.uid, "anon");
                assert_eq!(user.email, None);
                assert_eq!(user.display_name, None);
                assert_eq!(expires_in, 60);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    fn verification_result() -> impl Strategy<Value = Result<IdentityClaims, VerificationError>> {
        prop_oneof![
            "[a-zA-Z0-9]{1,28}".prop_map(|subject| Ok(IdentityClaims {
                subject,
                email: None,
                email_verified: true,
                display_name: None,
                photo_url: None,
            })),
            ".*".prop_map(|m| Err(VerificationError::InvalidAssertion(m))),
            ".*".prop_map(|m| Err(VerificationError::ProviderUnavailable(m))),
            ".*".prop_map(|m| Err(VerificationError::Unexpected(m))),
        ]
    }

    proptest! {
        #[test]
        fn prop_success_iff_verification_succeeds(result in verification_result()) {
            let expected_subject = result.as_ref().ok().map(|claims| claims.subject.clone());
            let service = service_with(StubVerifier::returning(result), issuer(3600));

            let outcome = tokio_test::block_on(service.authenticate("valid-token-abc"));

            prop_assert_eq!(outcome.is_success(), expected_subject.is_some());
            if let (AuthOutcome::Success { user, .. }, Some(subject)) = (outcome, expected_subject) {
                prop_assert_eq!(user.uid, subject);
            }
        }
    }
}
