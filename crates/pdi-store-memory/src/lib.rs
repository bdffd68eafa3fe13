//! In-memory backend for the PDI people store, and the [`FallbackStore`]
//! that switches to it when the live backend fails.

mod fallback;
mod memory;

pub use fallback::FallbackStore;
pub use memory::MemoryStore;

#[cfg(test)]
mod tests;
