use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{service::EnrollmentService, types::EnrollmentRequest};
use crate::course::models::CourseModel;
use crate::session::StudentId;
use crate::shared::{AppError, AppState, CreatedResponse, JsonBody, MessageResponse, PathParam};
use crate::student::types::StudentResponse;

fn enrollment_service(state: &AppState) -> EnrollmentService {
    EnrollmentService::new(Arc::clone(&state.enrollment_repository))
}

/// HTTP handler for a student enrolling in a course
///
/// POST /api/enrollment
/// Returns 201 with the enrollment id
#[instrument(name = "enroll", skip(state))]
pub async fn enroll(
    State(state): State<AppState>,
    Extension(StudentId(caller)): Extension<StudentId>,
    WithRejection(Json(request), _): JsonBody<EnrollmentRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = enrollment_service(&state).enroll(caller, request).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// POST /api/unenrollment
#[instrument(name = "unenroll", skip(state))]
pub async fn unenroll(
    State(state): State<AppState>,
    Extension(StudentId(caller)): Extension<StudentId>,
    WithRejection(Json(request), _): JsonBody<EnrollmentRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    enrollment_service(&state).unenroll(caller, request).await?;

    Ok(Json(MessageResponse::new(
        "Student unenrolled from course successfully",
    )))
}

/// HTTP handler listing the courses a student is enrolled in
///
/// GET /api/enrolled/students/:id
/// Only the student themselves may list their courses
#[instrument(name = "courses_for_student", skip(state))]
pub async fn courses_for_student(
    State(state): State<AppState>,
    Extension(StudentId(caller)): Extension<StudentId>,
    WithRejection(Path(student_id), _): PathParam<i64>,
) -> Result<Json<Vec<CourseModel>>, AppError> {
    let courses = enrollment_service(&state)
        .courses_for_student(caller, student_id)
        .await?;

    info!(course_count = courses.len(), "Enrolled courses listed");
    Ok(Json(courses))
}

/// GET /api/enrolled/courses/:id
#[instrument(name = "students_for_course", skip(state))]
pub async fn students_for_course(
    State(state): State<AppState>,
    WithRejection(Path(course_id), _): PathParam<i64>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    let students = enrollment_service(&state)
        .students_for_course(course_id)
        .await?;

    info!(student_count = students.len(), "Enrolled students listed");
    Ok(Json(students))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{models::fixtures::new_course, repository::CourseRepository};
    use crate::enrollment::repository::EnrollmentRepository;
    use crate::session::{
        cookie::SESSION_COOKIE_NAME, require_admin, require_student, SessionSubject,
    };
    use crate::shared::test_utils::{test_codec, AppStateBuilder};
    use crate::store::InMemoryStore;
    use crate::student::{models::fixtures::new_student, repository::StudentRepository};
    use axum::{
        body::Body,
        http::{header::COOKIE, Request},
        middleware,
        routing::{get, post},
        Router,
    };
    use rstest::rstest;
    use tower::ServiceExt; // for `oneshot`

    struct Fixture {
        app: Router,
        store: Arc<InMemoryStore>,
        ann: i64,
        bob: i64,
        rust: i64,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let ann = store
            .create_student(new_student("Ann", "ann@x.com"))
            .await
            .unwrap();
        let bob = store
            .create_student(new_student("Bob", "bob@x.com"))
            .await
            .unwrap();
        let rust = store.create_course(new_course("Rust")).await.unwrap();

        let state = AppStateBuilder::new().with_store(store.clone()).build();
        let student = Router::new()
            .route("/enrollment", post(enroll))
            .route("/unenrollment", post(unenroll))
            .route("/enrolled/students/:id", get(courses_for_student))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_student,
            ));
        let admin = Router::new()
            .route("/enrolled/courses/:id", get(students_for_course))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

        Fixture {
            app: Router::new().merge(student).merge(admin).with_state(state),
            store,
            ann,
            bob,
            rust,
        }
    }

    fn student_cookie(id: i64) -> String {
        let token = test_codec()
            .issue(&SessionSubject::Student {
                id,
                email: format!("student{}@x.com", id),
            })
            .unwrap();
        format!("{}={}", SESSION_COOKIE_NAME, token)
    }

    fn admin_cookie() -> String {
        let token = test_codec()
            .issue(&SessionSubject::Admin {
                email: "admin@school.test".to_string(),
            })
            .unwrap();
        format!("{}={}", SESSION_COOKIE_NAME, token)
    }

    fn post_json(uri: &str, cookie: String, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(COOKIE, cookie)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn pair(student_id: i64, course_id: i64) -> String {
        format!(
            r#"{{"student_id": {}, "course_id": {}}}"#,
            student_id, course_id
        )
    }

    #[tokio::test]
    async fn test_enroll_handler() {
        let f = fixture().await;

        let response = f
            .app
            .clone()
            .oneshot(post_json("/enrollment", student_cookie(f.ann), pair(f.ann, f.rust)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let created: CreatedResponse = serde_json::from_slice(&body).unwrap();
        assert!(created.id > 0);
        assert_eq!(f.store.enrollment_count().await, 1);
    }

    #[tokio::test]
    async fn test_enroll_twice_conflicts() {
        let f = fixture().await;
        f.store.enroll(f.ann, f.rust).await.unwrap();

        let response = f
            .app
            .oneshot(post_json("/enrollment", student_cookie(f.ann), pair(f.ann, f.rust)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(f.store.enrollment_count().await, 1);
    }

    #[tokio::test]
    async fn test_enroll_missing_course() {
        let f = fixture().await;

        let response = f
            .app
            .oneshot(post_json("/enrollment", student_cookie(f.ann), pair(f.ann, 99)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(f.store.enrollment_count().await, 0);
    }

    #[tokio::test]
    async fn test_enroll_on_behalf_of_another_student() {
        let f = fixture().await;

        let response = f
            .app
            .oneshot(post_json("/enrollment", student_cookie(f.ann), pair(f.bob, f.rust)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(f.store.enrollment_count().await, 0);
    }

    #[tokio::test]
    async fn test_unenroll_handler() {
        let f = fixture().await;
        f.store.enroll(f.ann, f.rust).await.unwrap();

        let response = f
            .app
            .clone()
            .oneshot(post_json("/unenrollment", student_cookie(f.ann), pair(f.ann, f.rust)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(f.store.enrollment_count().await, 0);

        let again = f
            .app
            .oneshot(post_json("/unenrollment", student_cookie(f.ann), pair(f.ann, f.rust)))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_courses_for_student_own_id_only() {
        let f = fixture().await;
        f.store.enroll(f.ann, f.rust).await.unwrap();

        let own = Request::builder()
            .method("GET")
            .uri(format!("/enrolled/students/{}", f.ann))
            .header(COOKIE, student_cookie(f.ann))
            .body(Body::empty())
            .unwrap();
        let response = f.app.clone().oneshot(own).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let courses: Vec<CourseModel> = serde_json::from_slice(&body).unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, f.rust);

        let other = Request::builder()
            .method("GET")
            .uri(format!("/enrolled/students/{}", f.ann))
            .header(COOKIE, student_cookie(f.bob))
            .body(Body::empty())
            .unwrap();
        let response = f.app.oneshot(other).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_students_for_course_admin_only() {
        let f = fixture().await;
        f.store.enroll(f.ann, f.rust).await.unwrap();
        f.store.enroll(f.bob, f.rust).await.unwrap();

        let as_admin = Request::builder()
            .method("GET")
            .uri(format!("/enrolled/courses/{}", f.rust))
            .header(COOKIE, admin_cookie())
            .body(Body::empty())
            .unwrap();
        let response = f.app.clone().oneshot(as_admin).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let students: Vec<StudentResponse> = serde_json::from_slice(&body).unwrap();
        let ids: Vec<i64> = students.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![f.ann, f.bob]);

        let as_student = Request::builder()
            .method("GET")
            .uri(format!("/enrolled/courses/{}", f.rust))
            .header(COOKIE, student_cookie(f.ann))
            .body(Body::empty())
            .unwrap();
        let response = f.app.oneshot(as_student).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[case::empty_object("{}")]
    #[case::missing_course(r#"{"student_id": 1}"#)]
    #[case::wrong_type(r#"{"student_id": "one", "course_id": 1}"#)]
    #[case::not_json("student_id=1&course_id=1")]
    #[tokio::test]
    async fn test_malformed_enrollment_body_is_bad_request(#[case] body: &str) {
        let f = fixture().await;

        let response = f
            .app
            .oneshot(post_json(
                "/enrollment",
                student_cookie(f.ann),
                body.to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["status"], "Error");
        assert!(error["error"].is_string());
        assert_eq!(f.store.enrollment_count().await, 0);
    }

    #[tokio::test]
    async fn test_enrollment_body_without_content_type_is_bad_request() {
        let f = fixture().await;
        let request = Request::builder()
            .method("POST")
            .uri("/unenrollment")
            .header(COOKIE, student_cookie(f.ann))
            .body(Body::from(pair(f.ann, f.rust)))
            .unwrap();

        let response = f.app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
