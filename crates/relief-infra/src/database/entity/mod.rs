//! SeaORM entities.

pub mod cache_entry;
