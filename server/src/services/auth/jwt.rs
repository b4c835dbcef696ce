use crate::config::settings::{AuthConfig, MAX_JWT_EXPIRATION_SECS, MIN_JWT_SECRET_BYTES};
use crate::error::AppError;
use crate::models::session_claims::SessionClaims;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{debug, error, info, trace};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionTokenError {
    #[error("Malformed session token: {0}")]
    MalformedToken(String),
    #[error("Invalid session token signature")]
    SignatureMismatch,
    #[error("Session token has expired")]
    Expired,
    #[error("Session token encoding failed: {0}")]
    Encoding(String),
}

/// Mints and checks HS256 session tokens.
///
/// The signing and verification keys are derived from the secret once, at
/// construction, and shared read-only by every request afterwards.
pub struct SessionTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration_secs: i64,
}

impl SessionTokenIssuer {
    pub fn new(secret: &[u8], expiration_secs: i64) -> Result<Self, AppError> {
        if secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(AppError::Configuration(format!(
                "JWT secret must be at least {} bytes",
                MIN_JWT_SECRET_BYTES
            )));
        }
        if expiration_secs <= 0 || expiration_secs > MAX_JWT_EXPIRATION_SECS {
            return Err(AppError::Configuration(format!(
                "JWT expiration must be between 1 and {} seconds",
                MAX_JWT_EXPIRATION_SECS
            )));
        }

        // Expiry is checked against an explicit clock in `verify_at`, with no leeway
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        info!("Session token issuer initialized (expiration: {}s)", expiration_secs);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expiration_secs,
        })
    }

    pub fn from_settings(auth: &AuthConfig) -> Result<Self, AppError> {
        Self::new(auth.jwt_secret.as_bytes(), auth.jwt_expiration_secs)
    }

    pub fn expires_in_seconds(&self) -> i64 {
        self.expiration_secs
    }

    /// Issue a session token for a verified identity
    pub fn issue(
        &self,
        subject: &str,
        email: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<String, SessionTokenError> {
        self.issue_at(subject, email, display_name, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        subject: &str,
        email: Option<&str>,
        display_name: Option<&str>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, SessionTokenError> {
        let expires_at = expiry_for(issued_at, self.expiration_secs).ok_or_else(|| {
            error!("Session token expiry overflows for issue time {}", issued_at);
            SessionTokenError::Encoding("expiration out of range".to_string())
        })?;

        let claims = SessionClaims {
            sub: subject.to_string(),
            email: email.map(str::to_string),
            display_name: display_name.map(str::to_string),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        debug!("Generating session token for user {} (exp: {})", subject, claims.exp);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                error!("Failed to generate session token: {}", e);
                SessionTokenError::Encoding(e.to_string())
            })
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionTokenError> {
        self.verify_at(token, Utc::now())
    }

    pub(crate) fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionTokenError> {
        let claims = self.decode_claims(token)?;

        if claims.exp <= now.timestamp() {
            debug!("Session token for user {} expired at {}", claims.sub, claims.exp);
            return Err(SessionTokenError::Expired);
        }

        Ok(claims)
    }

    /// True only when the token is authentic, unexpired and issued to `expected_subject`
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        self.validate_at(token, expected_subject, Utc::now())
    }

    pub(crate) fn validate_at(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> bool {
        match self.verify_at(token, now) {
            Ok(claims) => claims.sub == expected_subject,
            Err(e) => {
                debug!("Session token rejected: {}", e);
                false
            }
        }
    }

    /// Subject of an authentic token, whether or not it has expired
    pub fn decode_subject(&self, token: &str) -> Result<String, SessionTokenError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    /// Expiry of an authentic token, whether or not it has passed
    pub fn decode_expiry(&self, token: &str) -> Result<DateTime<Utc>, SessionTokenError> {
        let claims = self.decode_claims(token)?;
        DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| SessionTokenError::MalformedToken("expiry out of range".to_string()))
    }

    fn decode_claims(&self, token: &str) -> Result<SessionClaims, SessionTokenError> {
        trace!("Decoding session token");

        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => SessionTokenError::SignatureMismatch,
                ErrorKind::ExpiredSignature => SessionTokenError::Expired,
                ErrorKind::MissingRequiredClaim(claim) => {
                    SessionTokenError::MalformedToken(format!("missing required claim: {}", claim))
                }
                other => SessionTokenError::MalformedToken(format!("{:?}", other)),
            })
    }
}

/// Expiry instant of a token issued at `issued_at`, `None` when out of range
pub fn expiry_for(issued_at: DateTime<Utc>, expiration_secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(expiration_secs).and_then(|lifetime| issued_at.checked_add_signed(lifetime))
}
