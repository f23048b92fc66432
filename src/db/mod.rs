//! Row storage and the transaction overlay.
//!
//! [`Database`] is the committed view of the store; [`Transaction`] stages
//! writes in memory and flushes them atomically on commit. Both implement
//! [`DataView`], the read interface handed to permission rules, which is how
//! the runtime controls whether a check can observe uncommitted writes.

pub mod database;
pub mod transaction;

pub use database::Database;
pub use transaction::{DataView, Transaction};
