use axum::{extract::State, Extension, Json};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use tracing::{info, instrument};

use super::{
    cookie::{removal_cookie, session_cookie},
    service::SessionService,
    types::{LoginRequest, Role, SessionClaims, SessionInfoResponse},
};
use crate::shared::{AppError, AppState, JsonBody, MessageResponse};

fn session_service(state: &AppState) -> SessionService {
    SessionService::new(
        state.tokens.clone(),
        state.admin.clone(),
        state.student_repository.clone(),
    )
}

/// HTTP handler for administrator login
///
/// POST /api/admin
/// Sets the session cookie on success
#[instrument(name = "login_admin", skip(state, jar, request))]
pub async fn login_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(request), _): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let token = session_service(&state).login_admin(&request)?;

    Ok((
        jar.add(session_cookie(token)),
        Json(MessageResponse::new("Admin login successful")),
    ))
}

/// HTTP handler for student login
///
/// POST /api/students/login
#[instrument(name = "login_student", skip(state, jar, request))]
pub async fn login_student(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(request), _): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let token = session_service(&state).login_student(&request).await?;

    Ok((
        jar.add(session_cookie(token)),
        Json(MessageResponse::new("Login successful")),
    ))
}

/// HTTP handler for logout, mounted behind the admin and student gates
///
/// POST /api/admin/logout, POST /api/students/logout
/// Tokens stay valid until they expire; only the browser cookie is cleared.
#[instrument(name = "logout", skip_all)]
pub async fn logout(
    Extension(claims): Extension<SessionClaims>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    info!(role = %claims.role, "Clearing session cookie");

    let message = match claims.role {
        Role::Admin => "Admin logged out successfully",
        Role::Student => "Logged out successfully",
    };

    (jar.add(removal_cookie()), Json(MessageResponse::new(message)))
}

/// HTTP handler describing the caller's session
///
/// GET /api/session
pub async fn current_session(
    Extension(claims): Extension<SessionClaims>,
) -> Json<SessionInfoResponse> {
    Json(SessionInfoResponse::from(claims))
}
