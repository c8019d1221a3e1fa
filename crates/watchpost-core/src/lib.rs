//! Core types and trait definitions for the Watchpost incident store.
//!
//! This crate is deliberately free of database and hashing dependencies.
//! Storage backends implement [`store::RecordStore`]; the CSV column
//! reconciliation rules live in [`reconcile`] so they can be exercised without
//! a database.

pub mod error;
pub mod reconcile;
pub mod record;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
