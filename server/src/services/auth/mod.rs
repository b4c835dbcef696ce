pub mod authentication_service;
pub mod firebase_token_verifier;
pub mod identity_verifier;
pub mod jwt;

pub use authentication_service::AuthenticationService;
pub use firebase_token_verifier::FirebaseTokenVerifier;
pub use identity_verifier::{IdentityVerifier, VerificationError};
pub use jwt::{SessionTokenError, SessionTokenIssuer};
