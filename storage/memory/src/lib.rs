mod engine;
mod proxy;

pub use engine::{MemoryCollection, MemoryEngine};
pub use proxy::MemoryProxy;
