use axum::{extract::FromRequestParts, http::header};

use crate::{credentials::decode_token, error::AppError, state::AppState};

/// The authenticated caller. Only the username is trusted from the token;
/// role and approval are always re-read from the user record.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

impl AuthUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            return Err(AppError::unauthorized("Invalid Authorization scheme"));
        };

        let claims = decode_token(&state.config.jwt_secret, token.trim())?;
        if claims.sub.trim().is_empty() {
            return Err(AppError::unauthorized("Invalid or expired token"));
        }

        Ok(AuthUser {
            username: claims.sub,
        })
    }
}
