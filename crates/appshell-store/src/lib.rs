//! appshell Store - Embedded counter storage
//!
//! Holds the single named counter row the `incr` IPC channel writes to.
//! The store owns its SQLite connection: it is opened when the main process
//! starts and closed explicitly on shutdown.
//!
//! Two write paths exist. [`CounterStore::set`] overwrites the value and is
//! what the `incr` channel uses, since its result depends only on the
//! argument. [`CounterStore::apply`] is the increment API for updates derived
//! from the current value: the read and the write happen under one lock
//! inside one transaction, so concurrent callers never lose an update.
//!
//! # Example
//!
//! ```no_run
//! use appshell_store::CounterStore;
//!
//! fn example() -> appshell_store::StoreResult<()> {
//!     let store = CounterStore::open_in_memory()?;
//!     let value = store.apply(|current| current + 2.0)?;
//!     assert_eq!(value, 2.0);
//!     store.close()
//! }
//! ```

pub mod counter;

pub use counter::{CounterStore, StoreError, StoreResult, COUNTER_NAME};
