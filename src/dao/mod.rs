/// Key/value persistence backends.
pub mod kv_store;
/// Persisted record definitions.
pub mod models;
/// Storage abstraction layer shared by every backend.
pub mod storage;
/// Remote settlement endpoint client.
pub mod settlement_gateway;
