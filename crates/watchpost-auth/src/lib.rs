//! Username/password authentication for Watchpost.
//!
//! [`AuthGateway`] registers and authenticates users against any
//! [`RecordStore`](watchpost_core::store::RecordStore), delegating password
//! digests to a [`Digester`].

pub mod credentials;
pub mod digest;
pub mod error;
pub mod gateway;

pub use digest::{Argon2Digester, Digester};
pub use error::{Error, Result};
pub use gateway::{AuthGateway, LoginOutcome, RegisterOutcome};
