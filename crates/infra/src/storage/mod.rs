//! Durable storage adapters: per-user state documents and the blob gateway.

mod blob;
mod state_store;

pub use blob::HttpBlobStore;
pub use state_store::JsonStateStore;
