//! Cache layers for weather data
//!
//! The server keeps one in-memory [`SourceCache`] per upstream provider,
//! holding raw payloads keyed by rounded coordinates. The client keeps the
//! last merged report in a single on-disk slot managed by [`CacheManager`].

mod manager;
mod source;

pub use manager::{CacheManager, CachedData};
pub use source::SourceCache;
