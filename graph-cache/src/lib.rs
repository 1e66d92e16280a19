mod cache;

pub use cache::{CacheEntry, GraphCache};
