use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::config::settings::FirebaseConfig;
use crate::error::AppError;
use crate::models::identity::{IdentityAssertion, IdentityClaims};
use crate::services::auth::identity_verifier::{IdentityVerifier, VerificationError};
use crate::utils::http_client::new_provider_client;

/// Provider reasons that mean the ID token itself was refused
const TOKEN_REJECTION_REASONS: &[&str] = &[
    "INVALID_ID_TOKEN",
    "TOKEN_EXPIRED",
    "USER_NOT_FOUND",
    "USER_DISABLED",
    "CREDENTIAL_TOO_OLD_LOGIN_AGAIN",
];

/// Verifies Firebase ID tokens against the Identity Toolkit `accounts:lookup` API
pub struct FirebaseTokenVerifier {
    client: Client,
    lookup_url: String,
    /// Only labels log lines; the lookup is scoped by the API key
    project_id: String,
    api_key: String,
}

// Verification response from Firebase API
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<FirebaseUserInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirebaseUserInfo {
    #[serde(default)]
    local_id: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupErrorResponse {
    error: LookupErrorBody,
}

#[derive(Debug, Deserialize)]
struct LookupErrorBody {
    message: String,
}

impl FirebaseTokenVerifier {
    pub fn new(settings: &FirebaseConfig) -> Result<Self, AppError> {
        Self::with_base_url(
            &settings.auth_base_url,
            &settings.api_key,
            &settings.project_id,
            Duration::from_secs(settings.verify_timeout_secs),
        )
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        project_id: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::Configuration("Firebase API key must not be empty".to_string()));
        }

        info!("Initialized Firebase token verifier with project ID: {}", project_id);

        Ok(Self {
            client: new_provider_client(timeout)?,
            lookup_url: format!("{}/v1/accounts:lookup", base_url.trim_end_matches('/')),
            project_id: project_id.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn classify_transport_error(&self, e: reqwest::Error) -> VerificationError {
        if e.is_timeout() {
            warn!("Firebase lookup for project {} timed out", self.project_id);
            VerificationError::ProviderUnavailable("identity provider timed out".to_string())
        } else if e.is_connect() || e.is_request() {
            warn!("Firebase lookup for project {} failed to connect: {}", self.project_id, e);
            VerificationError::ProviderUnavailable("identity provider unreachable".to_string())
        } else {
            error!("Firebase lookup for project {} failed: {}", self.project_id, e);
            VerificationError::Unexpected(e.to_string())
        }
    }

    /// Only a 400 naming a token reason is the provider refusing the token.
    /// Key or permission problems (401, 403, "API key not valid") are ours.
    fn classify_status(status: StatusCode, body: &str) -> VerificationError {
        let provider_message = serde_json::from_str::<LookupErrorResponse>(body)
            .map(|r| r.error.message)
            .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));

        // Messages look like "TOKEN_EXPIRED" or "INVALID_ID_TOKEN : detail"
        let reason = provider_message
            .split(|c: char| c == ':' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            VerificationError::ProviderUnavailable(provider_message)
        } else if status == StatusCode::BAD_REQUEST && TOKEN_REJECTION_REASONS.contains(&reason) {
            VerificationError::InvalidAssertion(reason.to_string())
        } else {
            error!("Firebase lookup refused by provider configuration ({}): {}", status, provider_message);
            VerificationError::Unexpected(format!("provider refused lookup with status {}", status.as_u16()))
        }
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseTokenVerifier {
    async fn verify(&self, assertion: &IdentityAssertion) -> Result<IdentityClaims, VerificationError> {
        debug!("Verifying Firebase ID token");

        let response = self.client.post(&self.lookup_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({
                "idToken": assertion.as_str()
            }))
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Firebase API error: {} - {}", status, text);
            return Err(Self::classify_status(status, &text));
        }

        let lookup: LookupResponse = response.json()
            .await
            .map_err(|e| VerificationError::Unexpected(format!("Failed to parse verification response: {}", e)))?;

        let user = lookup.users
            .into_iter()
            .next()
            .ok_or_else(|| VerificationError::Unexpected("No user record returned for token".to_string()))?;

        if user.local_id.trim().is_empty() {
            return Err(VerificationError::Unexpected("User record has no localId".to_string()));
        }

        debug!("Firebase ID token verified for user {}", user.local_id);

        Ok(IdentityClaims {
            subject: user.local_id,
            email: user.email,
            email_verified: user.email_verified,
            display_name: user.display_name,
            photo_url: user.photo_url,
        })
    }
}
