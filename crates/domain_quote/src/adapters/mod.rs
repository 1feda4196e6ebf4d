//! Adapters implementing the quoting ports

pub mod memory;

pub use memory::{InMemoryCatalogAdapter, InMemoryQuoteRepository, InMemorySpecialRequestRepository};
