use serde::{Serialize, Serializer};
use std::fmt;

use super::identity::UserInfo;

/// Error codes surfaced to clients of the token exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorCode {
    /// Missing or malformed input, rejected before any provider call
    InvalidRequest,
    /// The identity provider rejected the ID token
    InvalidToken,
    /// The identity provider could not be consulted
    VerificationFailed,
    InternalError,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorCode::InvalidRequest => "INVALID_REQUEST",
            AuthErrorCode::InvalidToken => "INVALID_TOKEN",
            AuthErrorCode::VerificationFailed => "VERIFICATION_FAILED",
            AuthErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one token exchange. Built once through [`AuthOutcome::success`]
/// or [`AuthOutcome::failure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success {
        token: String,
        user: UserInfo,
        expires_in: i64,
    },
    Failure {
        error: AuthErrorCode,
        message: String,
    },
}

impl AuthOutcome {
    pub fn success(token: String, user: UserInfo, expires_in: i64) -> Self {
        AuthOutcome::Success { token, user, expires_in }
    }

    pub fn failure(error: AuthErrorCode, message: impl Into<String>) -> Self {
        AuthOutcome::Failure { error, message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success { .. })
    }

    pub fn error_code(&self) -> Option<AuthErrorCode> {
        match self {
            AuthOutcome::Success { .. } => None,
            AuthOutcome::Failure { error, .. } => Some(*error),
        }
    }
}

// Wire shape: {"success", "jwt", "user", "expiresIn"} or {"success", "error", "message"}
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    jwt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<AuthErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl Serialize for AuthOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let response = match self {
            AuthOutcome::Success { token, user, expires_in } => AuthResponse {
                success: true,
                jwt: Some(token.as_str()),
                user: Some(user),
                expires_in: Some(*expires_in),
                error: None,
                message: None,
            },
            AuthOutcome::Failure { error, message } => AuthResponse {
                success: false,
                jwt: None,
                user: None,
                expires_in: None,
                error: Some(*error),
                message: Some(message.as_str()),
            },
        };

        response.serialize(serializer)
    }
}
