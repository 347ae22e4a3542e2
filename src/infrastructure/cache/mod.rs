//! Cache backing store implementations

mod memory;

pub use memory::MemoryCacheStore;
