use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{NewStudent, StudentPatch},
    repository::StudentRepository,
    types::{RegisterStudentRequest, StudentResponse, UpdateStudentRequest},
};
use crate::{session::credentials::hash_password, shared::AppError};

/// Service for student registration, lookup and self-service updates
pub struct StudentService {
    repository: Arc<dyn StudentRepository + Send + Sync>,
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("Field '{}' is required", field)));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    require("email", email)?;
    if !email.contains('@') {
        return Err(AppError::BadRequest(format!("Invalid email address: {}", email)));
    }
    Ok(())
}

impl StudentService {
    pub fn new(repository: Arc<dyn StudentRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Validates the registration, hashes the password and stores the student
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterStudentRequest) -> Result<i64, AppError> {
        require("full_name", &request.full_name)?;
        validate_email(&request.email)?;
        require("password", &request.password)?;
        if request.age < 0 {
            return Err(AppError::BadRequest("Field 'age' cannot be negative".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let id = self
            .repository
            .create_student(NewStudent {
                full_name: request.full_name,
                email: request.email,
                password_hash,
                age: request.age,
                gender: request.gender,
                phone_number: request.phone_number,
                dob: request.dob,
                address: request.address,
            })
            .await?;

        info!(student_id = id, "Student registered");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<StudentResponse, AppError> {
        self.repository
            .get_student_by_id(id)
            .await?
            .map(StudentResponse::from)
            .ok_or_else(|| AppError::NotFound(format!("No student found with id {}", id)))
    }

    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<StudentResponse, AppError> {
        if email.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Missing email query parameter".to_string(),
            ));
        }

        self.repository
            .get_student_by_email(email)
            .await?
            .map(StudentResponse::from)
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<StudentResponse>, AppError> {
        let students = self.repository.list_students().await?;
        Ok(students.into_iter().map(StudentResponse::from).collect())
    }

    /// Applies a partial update to the student's own record.
    /// A new password is hashed before it reaches the store.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdateStudentRequest,
    ) -> Result<StudentResponse, AppError> {
        if let Some(full_name) = &request.full_name {
            require("full_name", full_name)?;
        }
        if let Some(email) = &request.email {
            validate_email(email)?;
        }
        if request.age.is_some_and(|age| age < 0) {
            return Err(AppError::BadRequest("Field 'age' cannot be negative".to_string()));
        }

        let password_hash = match &request.password {
            Some(password) => {
                require("password", password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let patch = StudentPatch {
            full_name: request.full_name,
            email: request.email,
            password_hash,
            age: request.age,
            gender: request.gender,
            phone_number: request.phone_number,
            dob: request.dob,
            address: request.address,
        };
        if patch.is_empty() {
            warn!(student_id = id, "Update request carried no fields");
        }

        let student = self.repository.update_student(id, &patch).await?;

        info!(student_id = id, "Student updated");
        Ok(StudentResponse::from(student))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::credentials::verify_student;
    use crate::store::InMemoryStore;

    fn registration(email: &str) -> RegisterStudentRequest {
        RegisterStudentRequest {
            full_name: "Ann".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            age: 20,
            gender: "female".to_string(),
            phone_number: "123".to_string(),
            dob: "2000-01-01".to_string(),
            address: "A St".to_string(),
        }
    }

    fn service() -> (StudentService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (StudentService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let (service, store) = service();

        let id = service.register(registration("ann@x.com")).await.unwrap();

        let stored = store.get_student_by_id(id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret1");
        assert!(verify_student("secret1", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_missing_fields() {
        let (service, _) = service();

        let mut no_name = registration("ann@x.com");
        no_name.full_name = "  ".to_string();
        assert!(matches!(
            service.register(no_name).await,
            Err(AppError::BadRequest(_))
        ));

        let mut no_password = registration("ann@x.com");
        no_password.password = String::new();
        assert!(matches!(
            service.register(no_password).await,
            Err(AppError::BadRequest(_))
        ));

        assert!(matches!(
            service.register(registration("not-an-email")).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, _) = service();
        service.register(registration("ann@x.com")).await.unwrap();

        let result = service.register(registration("ann@x.com")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_missing_student() {
        let (service, _) = service();

        assert!(matches!(service.get(5).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.get_by_email("ann@x.com").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.get_by_email("").await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_update_rehashes_new_password() {
        let (service, store) = service();
        let id = service.register(registration("ann@x.com")).await.unwrap();

        let updated = service
            .update(
                id,
                UpdateStudentRequest {
                    password: Some("secret2".to_string()),
                    address: Some("B St".to_string()),
                    ..UpdateStudentRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.address, "B St");
        assert_eq!(updated.full_name, "Ann");

        let stored = store.get_student_by_id(id).await.unwrap().unwrap();
        assert!(verify_student("secret2", &stored.password_hash).unwrap());
        assert!(!verify_student("secret1", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_update_rejects_blank_email() {
        let (service, _) = service();
        let id = service.register(registration("ann@x.com")).await.unwrap();

        let result = service
            .update(
                id,
                UpdateStudentRequest {
                    email: Some(String::new()),
                    ..UpdateStudentRequest::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
