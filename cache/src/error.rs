use thiserror::Error;

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// A bounded policy was configured with a capacity of zero. Every bounded
  /// policy needs room for at least one entry.
  #[error("bounded cache capacity cannot be zero")]
  ZeroCapacity,
  /// The janitor was enabled with a zero tick interval, which would spin.
  #[error("janitor interval cannot be zero")]
  ZeroJanitorInterval,
  /// The operating system refused to start the janitor thread.
  #[error("failed to spawn janitor thread: {0}")]
  JanitorSpawn(String),
}

/// Errors returned by lookups that report *why* a key could not be served.
///
/// Plain `get` folds both cases into `None`; `get_item` and the strict
/// counter operations on `NumberCache` surface them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
  /// The key is not present in the cache.
  #[error("item not found")]
  NotFound,
  /// The key is present but its time-to-live has elapsed.
  #[error("item expired")]
  Expired,
}
