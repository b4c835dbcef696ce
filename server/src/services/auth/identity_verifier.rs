use async_trait::async_trait;

use crate::models::identity::{IdentityAssertion, IdentityClaims};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// The provider rejected the token (malformed, expired, untrusted issuer)
    #[error("Invalid identity assertion: {0}")]
    InvalidAssertion(String),
    /// The provider could not be reached or failed transiently
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("Unexpected verification error: {0}")]
    Unexpected(String),
}

/// Exchanges a raw identity assertion for verified claims.
///
/// Implementations classify failures and return them; they never retry.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, assertion: &IdentityAssertion) -> Result<IdentityClaims, VerificationError>;
}
