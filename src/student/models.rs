use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for students table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct StudentModel {
    pub id: i64,
    pub full_name: String,
    pub email: String, // Unique, used as login key
    pub password_hash: String,
    pub age: i64,
    pub gender: String,
    pub phone_number: String,
    pub dob: String,
    pub address: String,
}

/// Row to insert on registration; the password is already hashed
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i64,
    pub gender: String,
    pub phone_number: String,
    pub dob: String,
    pub address: String,
}

impl NewStudent {
    pub fn into_model(self, id: i64) -> StudentModel {
        StudentModel {
            id,
            full_name: self.full_name,
            email: self.email,
            password_hash: self.password_hash,
            age: self.age,
            gender: self.gender,
            phone_number: self.phone_number,
            dob: self.dob,
            address: self.address,
        }
    }
}

/// Partial update: only `Some` fields overwrite the stored record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, student: &mut StudentModel) {
        if let Some(full_name) = &self.full_name {
            student.full_name = full_name.clone();
        }
        if let Some(email) = &self.email {
            student.email = email.clone();
        }
        if let Some(password_hash) = &self.password_hash {
            student.password_hash = password_hash.clone();
        }
        if let Some(age) = self.age {
            student.age = age;
        }
        if let Some(gender) = &self.gender {
            student.gender = gender.clone();
        }
        if let Some(phone_number) = &self.phone_number {
            student.phone_number = phone_number.clone();
        }
        if let Some(dob) = &self.dob {
            student.dob = dob.clone();
        }
        if let Some(address) = &self.address {
            student.address = address.clone();
        }
    }
}
