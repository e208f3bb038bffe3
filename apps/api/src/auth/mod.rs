//! Caller identity.
//!
//! The identity cookie carries an HS256-signed token. Every handler that acts
//! on behalf of a user takes a `Caller`, which only exists once the token's
//! signature and expiry have been checked.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Name of the cookie holding the identity token.
pub const IDENTITY_COOKIE: &str = "identity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Applicant,
    Recruiter,
    Company,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruiter_id: Option<Uuid>,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity token expired")]
    Expired,

    #[error("invalid identity token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

pub fn verify_token(secret: &str, token: &str) -> Result<IdentityClaims, IdentityError> {
    decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => IdentityError::Expired,
        _ => IdentityError::Invalid(e),
    })
}

/// A verified caller.
#[derive(Debug, Clone)]
pub struct Caller(pub IdentityClaims);

impl Caller {
    pub fn applicant_id(&self) -> Option<Uuid> {
        match self.0.role {
            Role::Applicant => self.0.applicant_id,
            _ => None,
        }
    }

    pub fn recruiter_id(&self) -> Option<Uuid> {
        match self.0.role {
            Role::Recruiter => self.0.recruiter_id,
            _ => None,
        }
    }

    pub fn require_applicant(&self) -> Result<Uuid, AppError> {
        self.applicant_id().ok_or(AppError::Forbidden)
    }

    pub fn require_recruiter(&self) -> Result<Uuid, AppError> {
        self.recruiter_id().ok_or(AppError::Forbidden)
    }
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(IDENTITY_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    })
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = verify_token(&state.config.identity_secret, &token).map_err(|e| {
            warn!("Rejected identity token: {e}");
            AppError::Unauthorized
        })?;
        Ok(Caller(claims))
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    /// Who a new token is for.
    #[derive(Debug, Clone)]
    pub struct NewIdentity {
        pub sub: String,
        pub role: Role,
        pub applicant_id: Option<Uuid>,
        pub recruiter_id: Option<Uuid>,
    }

    /// Tokens come from the external login service in production; tests mint
    /// their own with the shared secret.
    pub fn issue_token(secret: &str, identity: NewIdentity, ttl_secs: u64) -> Result<String, IdentityError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = IdentityClaims {
            sub: identity.sub,
            role: identity.role,
            applicant_id: identity.applicant_id,
            recruiter_id: identity.recruiter_id,
            iat: now,
            exp: now + ttl_secs,
        };
        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?)
    }

    pub fn applicant(applicant_id: Uuid) -> Caller {
        Caller(IdentityClaims {
            sub: applicant_id.to_string(),
            role: Role::Applicant,
            applicant_id: Some(applicant_id),
            recruiter_id: None,
            iat: 0,
            exp: u64::MAX,
        })
    }

    pub fn recruiter(recruiter_id: Uuid) -> Caller {
        Caller(IdentityClaims {
            sub: recruiter_id.to_string(),
            role: Role::Recruiter,
            applicant_id: None,
            recruiter_id: Some(recruiter_id),
            iat: 0,
            exp: u64::MAX,
        })
    }

    pub fn applicant_token(secret: &str, applicant_id: Uuid) -> String {
        issue_token(
            secret,
            NewIdentity {
                sub: applicant_id.to_string(),
                role: Role::Applicant,
                applicant_id: Some(applicant_id),
                recruiter_id: None,
            },
            3600,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_issued_token_verifies() {
        let applicant_id = Uuid::new_v4();
        let token = testing::applicant_token(SECRET, applicant_id);
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.role, Role::Applicant);
        assert_eq!(claims.applicant_id, Some(applicant_id));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = testing::applicant_token(SECRET, Uuid::new_v4());
        assert!(matches!(
            verify_token("another-secret", &token),
            Err(IdentityError::Invalid(_))
        ));
    }

    #[test]
    fn test_unsigned_json_cookie_is_rejected() {
        let forged = r#"{"applicantId":"8d7c5a8e-0000-0000-0000-000000000000"}"#;
        assert!(verify_token(SECRET, forged).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = IdentityClaims {
            sub: "u".to_string(),
            role: Role::Applicant,
            applicant_id: Some(Uuid::new_v4()),
            recruiter_id: None,
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            verify_token(SECRET, &token),
            Err(IdentityError::Expired)
        ));
    }

    #[test]
    fn test_token_read_from_cookie_or_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("theme=dark; identity=abc.def.ghi"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_role_gates() {
        let id = Uuid::new_v4();
        let caller = testing::applicant(id);
        assert_eq!(caller.require_applicant().unwrap(), id);
        assert!(matches!(caller.require_recruiter(), Err(AppError::Forbidden)));
    }
}
