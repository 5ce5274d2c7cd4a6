pub mod persistence;

pub use persistence::{JsonFileStorage, SnapshotStorage};
