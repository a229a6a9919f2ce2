//! Domain types, validation rules, and media storage for Jotter.
//!
//! Nothing in this crate talks to the database or HTTP layer; the `db` and
//! `api` crates build on these primitives.

pub mod accounts;
pub mod categories;
pub mod error;
pub mod notes;
pub mod storage;
pub mod types;
pub mod validation;
