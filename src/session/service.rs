use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    credentials::{verify_admin, verify_student},
    token::SessionTokenCodec,
    types::{LoginRequest, SessionSubject},
};
use crate::{config::AdminCredentials, shared::AppError, student::repository::StudentRepository};

/// Service for handling login and token issuance
pub struct SessionService {
    tokens: SessionTokenCodec,
    admin: Arc<AdminCredentials>,
    students: Arc<dyn StudentRepository + Send + Sync>,
}

impl SessionService {
    pub fn new(
        tokens: SessionTokenCodec,
        admin: Arc<AdminCredentials>,
        students: Arc<dyn StudentRepository + Send + Sync>,
    ) -> Self {
        Self {
            tokens,
            admin,
            students,
        }
    }

    /// Checks the configured admin credentials and issues an admin token
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub fn login_admin(&self, request: &LoginRequest) -> Result<String, AppError> {
        if !verify_admin(&request.email, &request.password, &self.admin) {
            warn!("Admin login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue(&SessionSubject::Admin {
            email: request.email.clone(),
        })?;

        info!("Admin logged in");
        Ok(token)
    }

    /// Looks the student up by email, checks the password hash and issues a student token
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login_student(&self, request: &LoginRequest) -> Result<String, AppError> {
        let student = match self.students.get_student_by_email(&request.email).await? {
            Some(student) => student,
            None => {
                warn!("Student login rejected: unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !verify_student(&request.password, &student.password_hash)? {
            warn!(student_id = student.id, "Student login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue(&SessionSubject::Student {
            id: student.id,
            email: student.email.clone(),
        })?;

        info!(student_id = student.id, "Student logged in");
        Ok(token)
    }

    fn issue(&self, subject: &SessionSubject) -> Result<String, AppError> {
        self.tokens.issue(subject).map_err(|e| {
            warn!(error = %e, "Could not generate session token");
            AppError::Internal
        })
    }
}
