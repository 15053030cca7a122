use serde::Deserialize;

/// Request payload for `POST /api/courses`
#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub credits: i64,
    #[serde(default)]
    pub price: i64,
}

/// Query string for `GET /api/courses/search?name=`
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}
