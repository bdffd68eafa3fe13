//! Core types and access-policy logic for the PDI people store.
//!
//! This crate is deliberately free of HTTP and database dependencies. It holds
//! the role registry, the entity ownership map, the visibility policy
//! evaluator, confidentiality masking, the data-source mode controller and the
//! [`store::PeopleStore`] abstraction every backend implements.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod actor;
pub mod entity;
pub mod error;
pub mod mask;
pub mod mode;
pub mod mutation;
pub mod policy;
pub mod role;
pub mod sample;
pub mod store;
pub mod team;

pub use error::{Error, Result};
