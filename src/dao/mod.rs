/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Team and match persistence behind a backend-agnostic trait.
pub mod tournament_store;
