pub mod lfu;
pub mod lru;
pub mod tiny_lfu;

pub use lfu::LfuCache;
pub use lru::LruCore;
pub use tiny_lfu::TinyLfuCache;
