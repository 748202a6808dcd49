//! Resolution cache
//!
//! - `lru`: sharded, strictly bounded LRU
//! - `single_flight`: one origin read per concurrently missed key
//! - `negative`: TTL memory of absent codes
//! - `resolution`: the cache the resolver and create handler talk to

pub mod lru;
pub mod negative;
pub mod resolution;
pub mod single_flight;

pub use lru::{CacheEntry, ShardedLru};
pub use negative::NegativeCache;
pub use resolution::{CacheStats, ResolutionCache};
pub use single_flight::SingleFlight;
