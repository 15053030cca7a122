use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, instrument, warn};

use super::{
    cookie::session_token,
    token::SessionTokenCodec,
    types::{Role, SessionClaims, StudentId},
};
use crate::shared::{AppError, AppState};

/// Resolves the session carried by the request cookies.
///
/// Missing or unverifiable tokens are `Unauthorized`; a valid token for the
/// wrong role is `Forbidden`. The concrete token failure is only logged.
pub fn authorize(
    jar: &CookieJar,
    tokens: &SessionTokenCodec,
    required: Option<Role>,
) -> Result<SessionClaims, AppError> {
    let token = session_token(jar).ok_or_else(|| {
        warn!("Missing session cookie in request");
        AppError::Unauthorized("Missing session token".to_string())
    })?;

    let claims = tokens.verify(token).map_err(|e| {
        warn!(reason = %e, "Session token rejected");
        AppError::Unauthorized("Invalid or expired session token".to_string())
    })?;

    if let Some(role) = required {
        if claims.role != role {
            warn!(required = %role, actual = %claims.role, "Session role not permitted");
            return Err(AppError::Forbidden(format!("{} access required", role)));
        }
    }

    Ok(claims)
}

async fn gate(
    state: AppState,
    mut req: Request,
    next: Next,
    required: Option<Role>,
) -> Result<Response, AppError> {
    debug!(uri = %req.uri(), required = ?required, "Authorization gate triggered");

    let jar = CookieJar::from_headers(req.headers());
    let claims = authorize(&jar, &state.tokens, required)?;

    debug!(role = %claims.role, id = ?claims.id, "Session accepted, attaching claims");

    if let Some(id) = claims.id {
        req.extensions_mut().insert(StudentId(id));
    }
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Admits administrators only.
/// Usage: .route_layer(middleware::from_fn_with_state(state.clone(), session::require_admin))
#[instrument(skip_all)]
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate(state, req, next, Some(Role::Admin)).await
}

/// Admits students only. Handlers can extract `Extension<StudentId>`.
#[instrument(skip_all)]
pub async fn require_student(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate(state, req, next, Some(Role::Student)).await
}

/// Admits any valid session regardless of role.
#[instrument(skip_all)]
pub async fn require_session(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate(state, req, next, None).await
}
