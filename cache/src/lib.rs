//! An in-process, thread-safe, generic key/value cache with interchangeable
//! eviction policies and per-item expiration.
//!
//! # Features
//! - **Eviction Policies**: LRU, MRU, FIFO, Clock and LFU, plus an unbounded
//!   map that never evicts. Custom engines plug in through [`Policy`].
//! - **Per-Item TTL**: every `set` may carry a time-to-live, and an overwrite
//!   can keep the TTL the key already had.
//! - **Background Janitor**: a thread that purges expired items on an interval
//!   and stops cleanly on cancellation, after one last sweep.
//! - **Counters**: [`NumberCache`] adds atomic increment and decrement.
//! - **Injectable Time**: all expiration decisions read a [`Clock`], so tests
//!   can freeze and move time with [`ManualClock`].
//! - **Persistence**: optional `serde` feature for saving and loading cache state.
//!
//! ```
//! use kestrel_cache::{CacheBuilder, ItemOptions, PolicyKind};
//! use std::time::Duration;
//!
//! let cache = CacheBuilder::<String, u32>::new()
//!   .policy(PolicyKind::Lru)
//!   .capacity(2)
//!   .build()
//!   .unwrap();
//!
//! cache.set("a".to_string(), 1);
//! cache.set("b".to_string(), 2);
//! cache.get(&"a".to_string());
//! cache.set("c".to_string(), 3);
//! assert_eq!(cache.keys(), vec!["a".to_string(), "c".to_string()]);
//!
//! cache.set_with("d".to_string(), 4, ItemOptions::new().with_expiration(Duration::from_secs(5)));
//! assert!(cache.contains(&"d".to_string()));
//! ```

// Public modules that form the API
pub mod builder;
pub mod error;
pub mod handles;
pub mod item;
pub mod number;
pub mod policy;
pub mod task;
pub mod time;

// Internal, crate-only modules
mod expiration;
mod shared;

#[cfg(feature = "serde")]
pub mod snapshot;

// Re-export the primary user-facing types for convenience
pub use builder::CacheBuilder;
pub use error::{BuildError, CacheError};
pub use handles::Cache;
pub use item::{Item, ItemOptions};
pub use number::{Number, NumberCache};
pub use policy::{Policy, PolicyKind, ReferenceCount};
pub use task::cancel::CancellationToken;
pub use time::{Clock, ManualClock, SystemClock};

#[cfg(feature = "serde")]
pub use snapshot::{CacheSnapshot, SnapshotEntry};
