//! Request extractors that gate access to handlers.
//!
//! - [`auth::AuthUser`] -- the authenticated, active caller.

pub mod auth;
