pub mod actions;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::TestResponse;
#[allow(unused_imports)]
pub use setup::{StoreKind, TestSetup, TestSetupBuilder, ADMIN_EMAIL, ADMIN_PASSWORD};
