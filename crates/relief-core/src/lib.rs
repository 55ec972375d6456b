//! # Relief Core
//!
//! The domain layer of the relief coordination backend.
//! This crate contains the cache contract, its collaborators' ports and
//! the services built on them, with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{CacheError, GeocodeError, NotifyError};
