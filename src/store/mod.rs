// Backing stores. Each implements the student, course and enrollment
// repository traits; the trait impls live next to the traits.
mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub(crate) use sqlite::database_error;
