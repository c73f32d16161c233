//! Data passed between the HTTP layer, the relay and the notes store.
//!
//! Enhancement types are transient and never persisted. Notes are owned by a
//! user id handed over by the identity layer.
pub mod enhancement;
pub mod note;
