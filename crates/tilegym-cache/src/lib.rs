//! A self-curating cache of generated levels.
//!
//! [`LevelCache`] keeps a fixed number of slots, each holding a level with
//! an `age` (times an episode beat it) and `tries` (times one did not).
//! Beating a slot needs a cumulative reward above
//! `max(aging_threshold - age, 0)` and replaces its level; a slot whose
//! `tries - age` exceeds the threshold is emptied. [`Bootstrapping`] wraps
//! an environment so that it fills the cache from finished episodes and,
//! once full, seeds new episodes from it.
//!
//! # Storage
//!
//! One file per slot, `map_<slot>.tgm`, in the cache directory. See
//! [`codec`] for the layout. Counters live in the file, so a cache reopened
//! over the same directory resumes where it stopped.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bootstrap;
pub mod codec;
pub mod error;
pub mod store;

pub use bootstrap::Bootstrapping;
pub use error::CacheError;
pub use store::{
    LevelCache, LevelCacheBuilder, Outcome, Start, DEFAULT_AGING_THRESHOLD, DEFAULT_CAPACITY,
    DEFAULT_P_RANDOM,
};
