use axum::Router;
use std::sync::Arc;

use campus_registry::{
    routes, AdminCredentials, AppState, InMemoryStore, SessionTokenCodec, SqliteStore,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "admin@school.test";
pub const ADMIN_PASSWORD: &str = "admin-pass";

/// Which backing store the router is wired to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreKind {
    Memory,
    Sqlite,
}

pub struct TestSetup {
    pub app: Router,
    pub tokens: SessionTokenCodec,
}

pub struct TestSetupBuilder {
    store: StoreKind,
    secret: &'static str,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            store: StoreKind::Memory,
            secret: TEST_SECRET,
        }
    }

    pub fn with_store(mut self, store: StoreKind) -> Self {
        self.store = store;
        self
    }

    pub fn with_secret(mut self, secret: &'static str) -> Self {
        self.secret = secret;
        self
    }

    pub async fn build(self) -> TestSetup {
        let tokens = SessionTokenCodec::new(self.secret).unwrap();
        let admin = AdminCredentials {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        };

        let state = match self.store {
            StoreKind::Memory => {
                AppState::with_store(tokens.clone(), admin, Arc::new(InMemoryStore::new()))
            }
            StoreKind::Sqlite => {
                let store = SqliteStore::in_memory().await.unwrap();
                AppState::with_store(tokens.clone(), admin, Arc::new(store))
            }
        };

        TestSetup {
            app: routes::router(state),
            tokens,
        }
    }
}
