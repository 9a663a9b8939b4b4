//! Database row structs.
//!
//! Each submodule contains a `FromRow` struct matching the query result and
//! a conversion into the corresponding `tourline_core` entity.

pub mod band;
pub mod manager;
pub mod tour;
