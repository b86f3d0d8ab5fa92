//! Letterboxd film metadata resolution: slug derivation, the durable outcome
//! cache, and the ordered lookup strategies.

pub(crate) mod cache;
pub(crate) mod resolver;
pub(crate) mod slug;

pub use cache::{CacheLookup, DetailsCache};
pub use resolver::{DetailsResolver, DEFAULT_BASE_URL};
pub use slug::{film_cache_key, title_slug};
