//! Authentication middleware
//!
//! Verifies the bearer token and attaches the calling company to the request.
//! Tokens are issued elsewhere; this service only checks them.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// Tenant identity extracted from a verified token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthCompany {
    pub company_id: Uuid,
}

impl AuthCompany {
    /// Reject requests whose path names a different company than the token
    pub fn ensure_company(&self, company_id: Uuid) -> Result<(), AppError> {
        if self.company_id == company_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Token does not grant access to this company".to_string(),
            ))
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub company_id: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
            .into_response();
    };

    match decode_company(bearer.token(), &state.config.jwt.secret) {
        Ok(company) => {
            request.extensions_mut().insert(company);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Decode a token and parse its company claim
pub fn decode_company(token: &str, secret: &str) -> Result<AuthCompany, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    let company_id = Uuid::parse_str(&claims.company_id)
        .map_err(|_| AppError::Unauthorized("Invalid company ID in token".to_string()))?;

    Ok(AuthCompany { company_id })
}

/// Extractor for the authenticated company
#[derive(Clone, Copy, Debug)]
pub struct CurrentCompany(pub AuthCompany);

impl CurrentCompany {
    pub fn id(&self) -> Uuid {
        self.0.company_id
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentCompany
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCompany>()
            .copied()
            .map(CurrentCompany)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
