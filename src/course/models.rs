use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for courses table, also the HTTP representation
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct CourseModel {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub duration: String,
    pub credits: i64,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub name: String,
    pub description: String,
    pub duration: String,
    pub credits: i64,
    pub price: i64,
}

impl NewCourse {
    pub fn into_model(self, id: i64) -> CourseModel {
        CourseModel {
            id,
            name: self.name,
            description: self.description,
            duration: self.duration,
            credits: self.credits,
            price: self.price,
        }
    }
}

/// Partial update: only `Some` fields overwrite the stored record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoursePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub credits: Option<i64>,
    pub price: Option<i64>,
}

impl CoursePatch {
    pub fn apply(&self, course: &mut CourseModel) {
        if let Some(name) = &self.name {
            course.name = name.clone();
        }
        if let Some(description) = &self.description {
            course.description = description.clone();
        }
        if let Some(duration) = &self.duration {
            course.duration = duration.clone();
        }
        if let Some(credits) = self.credits {
            course.credits = credits;
        }
        if let Some(price) = self.price {
            course.price = price;
        }
    }
}
