use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

use super::types::{SessionClaims, SessionSubject};
use crate::config::ConfigError;

/// Lifetime of every issued session token
pub const SESSION_TTL_HOURS: i64 = 24;

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("token signature does not verify")]
    InvalidSignature,

    #[error("token signed with an unexpected algorithm")]
    InvalidAlgorithm,

    #[error("token has expired")]
    Expired,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

/// Issues and verifies HMAC-signed session tokens
#[derive(Clone)]
pub struct SessionTokenCodec {
    secret: Arc<[u8]>,
    ttl: Duration,
}

impl SessionTokenCodec {
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }

        Ok(Self {
            secret: Arc::from(secret.as_bytes()),
            ttl: Duration::hours(SESSION_TTL_HOURS),
        })
    }

    /// Creates a token for the subject, valid for 24 hours from now
    pub fn issue(&self, subject: &SessionSubject) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Creates a token as if it had been issued at `issued_at`
    #[instrument(skip(self, subject), fields(role = %subject.role()))]
    pub fn issue_at(
        &self,
        subject: &SessionSubject,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = SessionClaims {
            role: subject.role(),
            id: subject.student_id(),
            email: subject.email().to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        debug!(exp_timestamp = claims.exp, "Creating session token");

        encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode session token");
            TokenError::Encoding(e.to_string())
        })
    }

    /// Validates a token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;

        let claims = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode session token");
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::InvalidAlgorithm
                }
                _ => TokenError::Malformed,
            }
        })?;

        // jsonwebtoken accepts exp == now; sessions end at exp.
        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        if !claims.is_consistent() {
            debug!(role = %claims.role, "Role and subject id disagree");
            return Err(TokenError::Malformed);
        }

        debug!(role = %claims.role, exp = claims.exp, "Session token verified");
        Ok(claims)
    }
}
