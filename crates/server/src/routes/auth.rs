use std::collections::HashMap;

use axum::{extract::{Request, State}, http::StatusCode, middleware::Next, response::Response};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use service::samples::SamplesService;

pub const UPN_CLAIM: &str = "upn";
pub const UPN_URI_CLAIM: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/upn";

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub auth: ServerAuthConfig,
    pub samples: SamplesService,
    pub default_locale: String,
}

/// Identity of an authenticated caller, inserted into request extensions.
#[derive(Clone, Debug, Default)]
pub struct AuthenticatedUser {
    /// User principal name from the token, when the token carries one.
    pub upn: Option<String>,
}

impl AuthenticatedUser {
    pub fn upn(&self) -> Option<&str> { self.upn.as_deref() }
}

/// The `upn` claim, falling back to the URI-form claim; claim names compare
/// case-insensitively.
pub fn user_principal_name(claims: &HashMap<String, Value>) -> Option<String> {
    let find = |name: &str| {
        claims
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_str())
            .map(str::to_string)
    };
    find(UPN_CLAIM).or_else(|| find(UPN_URI_CLAIM))
}

/// Route middleware: require `Authorization: Bearer <token>` signed with the
/// configured secret. Missing, malformed, invalid or expired tokens get 401;
/// on success the caller's [`AuthenticatedUser`] is added to the request.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();

    let authz = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match authz {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(StatusCode::UNAUTHORIZED);
            }
        },
        None => {
            tracing::warn!(path = %path, "missing Authorization header");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    match decode::<HashMap<String, Value>>(&token, &key, &validation) {
        Ok(data) => {
            let user = AuthenticatedUser { upn: user_principal_name(&data.claims) };
            tracing::debug!(path = %path, upn = ?user.upn, "token accepted");
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::error!(path = %path, err = %e, "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
