//! SQLite persistence: the archived article collection and the settings store.

mod articles;
mod preferences;
mod schema;
mod types;

pub use schema::Database;
pub use types::DatabaseError;
