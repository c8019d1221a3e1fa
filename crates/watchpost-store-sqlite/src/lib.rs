//! SQLite backend for the Watchpost incident store.
//!
//! A [`SqliteStore`] owns one connection for the lifetime of a unit of work
//! and releases it when dropped. All calls are synchronous.

mod analytics;
mod encode;
mod ingest;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use ingest::{IngestReport, IngestSkip};
pub use store::SqliteStore;
