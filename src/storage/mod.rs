//! Storage implementations for document collections

pub mod in_memory;

pub use in_memory::InMemoryDataService;
