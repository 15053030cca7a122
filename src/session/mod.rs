// Public API - what other modules can use
pub use handlers::{current_session, login_admin, login_student, logout};
pub use middleware::{authorize, require_admin, require_session, require_student};
pub use token::{SessionTokenCodec, TokenError, SESSION_TTL_HOURS};
pub use types::{Role, SessionClaims, SessionSubject, StudentId};

// Internal modules
pub mod cookie;
pub mod credentials;
mod handlers;
mod middleware;
pub mod service;
mod token;
pub mod types;
