//! Background work for the cache: the janitor that purges expired items and
//! the cancellation signal that stops it.

pub mod cancel;
pub(crate) mod janitor;
