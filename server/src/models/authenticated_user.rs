use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use serde::Serialize;
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::services::auth::jwt::{SessionTokenError, SessionTokenIssuer};

/// Identity carried by a valid `Authorization: Bearer <session token>` header
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl AuthenticatedUser {
    fn from_http_request(req: &HttpRequest) -> Result<Self, AppError> {
        let issuer = req
            .app_data::<web::Data<SessionTokenIssuer>>()
            .ok_or_else(|| AppError::Internal("Session token issuer not registered".to_string()))?;

        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Auth("Missing Authorization header".to_string()))?
            .to_str()
            .map_err(|_| AppError::Auth("Invalid Authorization header format".to_string()))?;

        let token = bearer_token(auth_header)
            .ok_or_else(|| AppError::Auth("Invalid Authorization header format".to_string()))?;

        let claims = issuer.verify(token).map_err(|e| match e {
            SessionTokenError::Expired => AppError::Auth("Token has expired".to_string()),
            SessionTokenError::SignatureMismatch => AppError::Auth("Invalid token signature".to_string()),
            SessionTokenError::MalformedToken(_) => AppError::Auth("Invalid token format".to_string()),
            SessionTokenError::Encoding(msg) => AppError::Internal(msg),
        })?;

        Ok(Self {
            uid: claims.sub,
            email: claims.email,
            display_name: claims.display_name,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

/// Token from a `Bearer` credential; the scheme name is case-insensitive
fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim_start().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::authentication_service::tests::issuer;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("BEARER   abc.def.ghi "), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }

    #[test]
    fn test_lowercase_scheme_authenticates() {
        let issuer = issuer(3600);
        let token = issuer.issue("u1", Some("a@b.com"), None).unwrap();
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, format!("bearer {}", token)))
            .app_data(web::Data::from(issuer))
            .to_http_request();

        let user = AuthenticatedUser::from_http_request(&req).unwrap();

        assert_eq!(user.uid, "u1");
        assert_eq!(user.email.as_deref(), Some("a@b.com"));
        assert!(user.expires_at > user.issued_at);
    }

    #[test]
    fn test_missing_issuer_is_internal_error() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc"))
            .to_http_request();

        assert!(matches!(
            AuthenticatedUser::from_http_request(&req),
            Err(AppError::Internal(_))
        ));
    }
}
