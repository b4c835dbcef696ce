use serde::{Deserialize, Serialize};

/// Payload of an issued session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (identity provider user id)
    pub sub: String,
    /// User email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// User display name
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Issued at (epoch seconds)
    pub iat: i64,
    /// Expiration time (epoch seconds)
    pub exp: i64,
}
