use serde::Serialize;
use std::fmt;

/// Raw Firebase ID token presented by a client.
///
/// Only constructed through [`IdentityAssertion::parse`], so holding one means
/// the emptiness and length checks have already run.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityAssertion(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssertionRejection {
    #[error("ID token is required")]
    Empty,
    #[error("ID token must not exceed {max} characters")]
    TooLong { max: usize },
}

impl IdentityAssertion {
    pub fn parse(raw: &str, max_length: usize) -> Result<Self, AssertionRejection> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(AssertionRejection::Empty);
        }

        if trimmed.chars().count() > max_length {
            return Err(AssertionRejection::TooLong { max: max_length });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print the credential itself
impl fmt::Debug for IdentityAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityAssertion(len={})", self.0.len())
    }
}

/// Claims produced by a successful identity-provider verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Provider user id, never empty
    pub subject: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Canonical identity record returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub email_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_input() {
        let assertion = IdentityAssertion::parse("  abc.def.ghi \n", 100).unwrap();
        assert_eq!(assertion.as_str(), "abc.def.ghi");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(IdentityAssertion::parse("", 100), Err(AssertionRejection::Empty));
        assert_eq!(IdentityAssertion::parse("   \t", 100), Err(AssertionRejection::Empty));
    }

    #[test]
    fn test_parse_rejects_over_length() {
        let raw = "x".repeat(11);
        assert_eq!(
            IdentityAssertion::parse(&raw, 10),
            Err(AssertionRejection::TooLong { max: 10 })
        );
        assert!(IdentityAssertion::parse(&raw[..10], 10).is_ok());
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let assertion = IdentityAssertion::parse("secret-id-token", 100).unwrap();
        let printed = format!("{:?}", assertion);
        assert!(!printed.contains("secret"));
    }

    #[test]
    fn test_user_info_omits_absent_fields() {
        let user = UserInfo {
            uid: "u1".to_string(),
            email: None,
            display_name: None,
            photo_url: None,
            email_verified: false,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, serde_json::json!({ "uid": "u1", "emailVerified": false }));
    }
}
