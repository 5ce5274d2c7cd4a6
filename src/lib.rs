// ============================================================================
// carstore library
// ============================================================================

pub mod config;
pub mod model;
pub mod storage;
pub mod store;
pub mod web;

// Re-export main types for convenience
pub use model::{Car, CarFields, CarId, CarPatch};
pub use storage::{JsonFileStorage, SnapshotStorage};
pub use store::CarStore;
pub use store::error::{Result, StoreError};
pub use web::{AppState, build_router};
