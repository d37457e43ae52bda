pub mod markov;
pub mod shard;
pub mod sketch;

pub use markov::MarkovPredictor;
pub use shard::{shard_capacities, ShardSelector};
pub use sketch::CountMinSketch;
