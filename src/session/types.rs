use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Role claim embedded in every session token
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

/// Who a token is issued to. Only students carry a numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSubject {
    Admin { email: String },
    Student { id: i64, email: String },
}

impl SessionSubject {
    pub fn role(&self) -> Role {
        match self {
            SessionSubject::Admin { .. } => Role::Admin,
            SessionSubject::Student { .. } => Role::Student,
        }
    }

    pub fn student_id(&self) -> Option<i64> {
        match self {
            SessionSubject::Admin { .. } => None,
            SessionSubject::Student { id, .. } => Some(*id),
        }
    }

    pub fn email(&self) -> &str {
        match self {
            SessionSubject::Admin { email } | SessionSubject::Student { email, .. } => email,
        }
    }
}

/// JWT claims structure containing session information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub email: String,
    pub iat: i64, // Issued at timestamp (standard JWT claim)
    pub exp: i64, // Expiration timestamp (standard JWT claim)
}

impl SessionClaims {
    /// Role and id agree: students carry an id, admins never do
    pub fn is_consistent(&self) -> bool {
        match self.role {
            Role::Admin => self.id.is_none(),
            Role::Student => self.id.is_some(),
        }
    }
}

/// Authenticated student id, attached to requests that passed a student session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentId(pub i64);

/// Request payload shared by the admin and student login endpoints
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for `GET /api/session`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionInfoResponse {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub email: String,
    pub expires_at: i64,
}

impl From<SessionClaims> for SessionInfoResponse {
    fn from(claims: SessionClaims) -> Self {
        Self {
            role: claims.role,
            id: claims.id,
            email: claims.email,
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), r#""student""#);
        assert_eq!(Role::from_str("student").unwrap(), Role::Student);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!(Role::from_str("teacher").is_err());
    }

    #[test]
    fn test_admin_claims_omit_id() {
        let claims = SessionClaims {
            role: Role::Admin,
            id: None,
            email: "admin@school.test".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("\"id\""));
        assert!(json.contains(r#""role":"admin""#));

        let deserialized: SessionClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);
        assert!(deserialized.is_consistent());
    }

    #[test]
    fn test_claim_consistency() {
        let mut claims = SessionClaims {
            role: Role::Student,
            id: None,
            email: "ann@x.com".to_string(),
            exp: 10,
            iat: 0,
        };
        assert!(!claims.is_consistent());

        claims.id = Some(4);
        assert!(claims.is_consistent());

        claims.role = Role::Admin;
        assert!(!claims.is_consistent());
    }

    #[test]
    fn test_subject_accessors() {
        let student = SessionSubject::Student {
            id: 7,
            email: "ann@x.com".to_string(),
        };
        assert_eq!(student.role(), Role::Student);
        assert_eq!(student.student_id(), Some(7));
        assert_eq!(student.email(), "ann@x.com");

        let admin = SessionSubject::Admin {
            email: "admin@school.test".to_string(),
        };
        assert_eq!(admin.role(), Role::Admin);
        assert_eq!(admin.student_id(), None);
    }
}
