//! Async HTTP client for the PDI people API.
//!
//! Holds the signed-in actor, publishes session changes through a
//! [`tokio::sync::watch`] channel, and supports optimistic edits against a
//! local [`EntityCache`] that roll back when the server rejects them.

mod cache;
mod client;
mod error;

pub use cache::EntityCache;
pub use client::{ApiClient, ClientConfig};
pub use error::{Error, Result};
