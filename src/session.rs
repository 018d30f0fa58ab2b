//! Per-request session context decoded from the hosted auth provider's JWT.
//!
//! Handlers receive a [`SessionContext`] as an extractor argument; nothing
//! session-related is stored globally.

use actix_web::{dev::Payload, http::StatusCode, web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::future::{ready, Ready};
use thiserror::Error;

use crate::models::{ErrorResponse, UserRole};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("account role does not allow this action")]
    Forbidden,

    #[error("session verifier is not configured")]
    NotConfigured,
}

impl ResponseError for SessionError {
    fn status_code(&self) -> StatusCode {
        match self {
            SessionError::MissingToken | SessionError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            SessionError::Forbidden => StatusCode::FORBIDDEN,
            SessionError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: status.canonical_reason().unwrap_or("error").to_lowercase(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

/// The signed-in user, as asserted by the auth provider
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

impl SessionContext {
    pub fn require_role(&self, role: UserRole) -> Result<(), SessionError> {
        if self.role == Some(role) {
            Ok(())
        } else {
            Err(SessionError::Forbidden)
        }
    }
}

/// Verifies HS256 access tokens signed with the project's JWT secret
#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(jwt_secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);

        Self {
            key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<SessionContext, SessionError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        let claims = data.claims;

        Ok(SessionContext {
            user_id: claims.sub,
            email: claims.email,
            role: claims.user_metadata.role,
        })
    }

    fn verify_request(&self, req: &HttpRequest) -> Result<SessionContext, SessionError> {
        let token = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::MissingToken)?;

        self.verify(token)
    }
}

impl FromRequest for SessionContext {
    type Error = SessionError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<SessionVerifier>>() {
            Some(verifier) => verifier.verify_request(req),
            None => Err(SessionError::NotConfigured),
        };

        if let Err(e) = &result {
            tracing::debug!("Session rejected on {}: {}", req.path(), e);
        }

        ready(result)
    }
}
