//! Keyed query cache with optimistic mutations.
//!
//! The original system leans on a process-wide query cache; here it is an
//! explicit keyed store with first-class invalidation, snapshot/restore,
//! and per-key mutual exclusion. `MutationController` layers the optimistic
//! write / rollback / invalidate-on-settle protocol on top.

pub mod mutation;
pub mod store;

pub use mutation::{CachePatch, MutationController};
pub use store::{CacheSnapshot, QueryCache, QueryKey};
