use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    course, enrollment,
    session::{self, require_admin, require_session, require_student},
    shared::AppState,
    student,
};

/// Builds the full HTTP surface.
///
/// Each gated group carries exactly one gate through `route_layer`, so the
/// gate only runs for routes that matched. Groups sharing a path (such as
/// `/api/students`) are merged per method.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/admin", post(session::login_admin))
        .route("/api/students", post(student::register_student))
        .route("/api/students/login", post(session::login_student))
        .route("/api/courses/all", get(course::list_courses))
        .route("/api/courses/search", get(course::search_courses))
        .route("/api/courses/:id", get(course::get_course));

    let admin = Router::new()
        .route("/api/admin/logout", post(session::logout))
        .route("/api/students", get(student::find_student_by_email))
        .route("/api/students/all", get(student::list_students))
        .route("/api/students/:id", get(student::get_student))
        .route("/api/courses", post(course::create_course))
        .route("/api/courses/update/:id", put(course::update_course))
        .route(
            "/api/enrolled/courses/:id",
            get(enrollment::students_for_course),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let student = Router::new()
        .route("/api/students/update", put(student::update_student))
        .route("/api/students/logout", post(session::logout))
        .route("/api/enrollment", post(enrollment::enroll))
        .route("/api/unenrollment", post(enrollment::unenroll))
        .route(
            "/api/enrolled/students/:id",
            get(enrollment::courses_for_student),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_student,
        ));

    let any_role = Router::new()
        .route("/api/session", get(session::current_session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .merge(public)
        .merge(admin)
        .merge(student)
        .merge(any_role)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
