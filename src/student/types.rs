use serde::{Deserialize, Serialize};

use super::models::StudentModel;

/// Request payload for student self-registration
#[derive(Debug, Deserialize)]
pub struct RegisterStudentRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub age: i64,
    #[serde(default)]
    pub gender: String,
    #[serde(default, alias = "phone")]
    pub phone_number: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub address: String,
}

/// Request payload for `PUT /api/students/update`; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStudentRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    #[serde(alias = "phone")]
    pub phone_number: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
}

/// Query string for `GET /api/students?email=`
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

/// Student record as returned over HTTP. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentResponse {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub age: i64,
    pub gender: String,
    pub phone_number: String,
    pub dob: String,
    pub address: String,
}

impl From<StudentModel> for StudentResponse {
    fn from(student: StudentModel) -> Self {
        Self {
            id: student.id,
            full_name: student.full_name,
            email: student.email,
            age: student.age,
            gender: student.gender,
            phone_number: student.phone_number,
            dob: student.dob,
            address: student.address,
        }
    }
}
