pub mod clock;
pub mod key;
pub mod memo;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use key::{CacheKey, CacheOperation};
pub use memo::{CacheStats, Memoizer};
pub use store::{CacheStore, InMemoryCacheStore, RedisCacheStore};
