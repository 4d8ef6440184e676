pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

pub use config::AppConfig;
pub use error::{ApiError, Result};

// Export logic operations (merge protocol + space transactions)
pub use logic::*;

// Export all model types
pub use model::*;

// Export store types
pub use store::{HttpStore, MemoryStore, PermissionStore, SpaceStore, StatementStore, Store};
