pub use crate::ds::{CountMinSketch, MarkovPredictor, ShardSelector};
pub use crate::error::ConfigError;
pub use crate::metrics::{PredictiveMetricsSnapshot, TinyLfuMetricsSnapshot};
pub use crate::policy::{LfuCache, LruCore, TinyLfuCache};
pub use crate::predictive::{PredictiveCache, PredictiveOptions};
pub use crate::sharded::{ShardedCache, ShardedLru, ShardedTinyLfu};
pub use crate::traits::{
    AdmissionCache, ConcurrentCache, CoreCache, LfuCacheTrait, LruCacheTrait, MutableCache,
};
