//! Domain logic for the tour resource.
//!
//! Everything in this crate is synchronous and free of I/O: entities,
//! creation payload validation, representation projection, patch
//! application, and authorization policy evaluation. The persistence
//! collaborator lives in `tourline-db`; the HTTP pipeline in `tourline-api`.

pub mod creation;
pub mod error;
pub mod locks;
pub mod patch;
pub mod policy;
pub mod representation;
pub mod roles;
pub mod tour;
pub mod types;
