//! Authentication and authorization extractors.
//!
//! - [`auth::Caller`] -- Resolves the optional caller identity from a JWT Bearer token.
//! - [`policy::enforce`] -- Evaluates a selected variant's policies for a caller.

pub mod auth;
pub mod policy;
