pub mod auth_outcome;
pub mod authenticated_user;
pub mod identity;
pub mod session_claims;

pub use auth_outcome::{AuthErrorCode, AuthOutcome};
pub use authenticated_user::AuthenticatedUser;
pub use identity::{AssertionRejection, IdentityAssertion, IdentityClaims, UserInfo};
pub use session_claims::SessionClaims;
