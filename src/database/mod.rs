pub mod manager;
pub mod models;
pub mod partial_update;

pub use manager::{DatabaseError, DatabaseManager};
pub use partial_update::{PartialUpdate, UpdateStatement};
