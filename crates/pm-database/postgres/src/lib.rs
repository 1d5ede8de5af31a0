pub mod models;
pub mod repository;
pub mod schema;

// Re-export commonly used items
pub use diesel::prelude::*;
pub use repository::{PgSyncStore, StoreError, StoreResult, SyncStore};
