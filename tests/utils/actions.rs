use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        Method, Request, StatusCode,
    },
};
use axum_extra::extract::cookie::Cookie;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use campus_registry::session::cookie::SESSION_COOKIE_NAME;

use super::setup::{TestSetup, ADMIN_EMAIL, ADMIN_PASSWORD};

// ============================================================================
// Responses
// ============================================================================

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<Cookie<'static>>,
    pub body: Value,
}

impl TestResponse {
    /// Value of the session cookie the response set, if any
    pub fn session_token(&self) -> Option<String> {
        self.set_cookie
            .as_ref()
            .filter(|c| c.name() == SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
    }

    pub fn id(&self) -> i64 {
        self.body["id"]
            .as_i64()
            .unwrap_or_else(|| panic!("response has no id: {}", self.body))
    }

    pub fn assert_error(&self, status: StatusCode) {
        assert_eq!(self.status, status, "unexpected body: {}", self.body);
        assert_eq!(self.body["status"], "Error");
        assert!(self.body["error"].is_string());
    }
}

// ============================================================================
// Request Helpers
// ============================================================================

impl TestSetup {
    /// Sends one request through the router, with the session token as cookie when given
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(COOKIE, format!("{}={}", SESSION_COOKIE_NAME, token));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .map(|v| Cookie::parse(v.to_str().unwrap().to_string()).unwrap());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            set_cookie,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Registers a student with a default profile and returns the new id
    pub async fn register_student(&self, full_name: &str, email: &str, password: &str) -> i64 {
        let response = self
            .post(
                "/api/students",
                None,
                json!({
                    "full_name": full_name,
                    "email": email,
                    "password": password,
                    "age": 20,
                    "gender": "female",
                    "phone_number": "123",
                    "dob": "2000-01-01",
                    "address": "A St",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.id()
    }

    /// Logs a student in and returns the session token from the cookie
    pub async fn login_student(&self, email: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/students/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.session_token().expect("login should set the session cookie")
    }

    pub async fn login_admin(&self) -> String {
        let response = self
            .post(
                "/api/admin",
                None,
                json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.session_token().expect("login should set the session cookie")
    }

    /// Creates a course as admin and returns its id
    pub async fn create_course(&self, admin_token: &str, name: &str) -> i64 {
        let response = self
            .post(
                "/api/courses",
                Some(admin_token),
                json!({
                    "name": name,
                    "description": format!("{} fundamentals", name),
                    "duration": "12 weeks",
                    "credits": 4,
                    "price": 300,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.id()
    }

    pub async fn enroll(&self, token: &str, student_id: i64, course_id: i64) -> TestResponse {
        self.post(
            "/api/enrollment",
            Some(token),
            json!({ "student_id": student_id, "course_id": course_id }),
        )
        .await
    }

    pub async fn unenroll(&self, token: &str, student_id: i64, course_id: i64) -> TestResponse {
        self.post(
            "/api/unenrollment",
            Some(token),
            json!({ "student_id": student_id, "course_id": course_id }),
        )
        .await
    }

    /// Ids of the courses the student is enrolled in, as seen by the student
    pub async fn enrolled_course_ids(&self, token: &str, student_id: i64) -> Vec<i64> {
        let response = self
            .get(&format!("/api/enrolled/students/{}", student_id), Some(token))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect()
    }
}
