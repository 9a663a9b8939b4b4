//! Well-known role claim values.
//!
//! These must match the `role` claim written into access tokens by the
//! identity provider.

/// Marker checked by the `AdministratorRole` policy.
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
