//! Authorization policy evaluation.
//!
//! A request variant carries a list of named [`Policy`] requirements that
//! must all pass. Each policy is a pure predicate over the caller's identity
//! and, where relevant, the target resource. Identity is supplied already
//! resolved; nothing here blocks or performs I/O.

use std::fmt;

use crate::roles::ROLE_ADMIN;
use crate::tour::Owned;
use crate::types::EntityId;

/// Named authorization requirement attached to a request variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Caller's identity must equal the target resource's owning manager.
    OwnerMatch,
    /// Caller's role claim must equal the administrator marker.
    AdministratorRole,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::OwnerMatch => f.write_str("OwnerMatch"),
            Policy::AdministratorRole => f.write_str("AdministratorRole"),
        }
    }
}

/// Caller identity as carried by the access token.
///
/// `subject` is kept verbatim; whether it parses as an owner id is a
/// policy decision, not an authentication failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub subject: String,
    pub role: String,
}

impl CallerIdentity {
    pub fn new(subject: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            role: role.into(),
        }
    }

    /// The subject as an owner id, if it is one.
    pub fn owner_id(&self) -> Option<EntityId> {
        self.subject.parse().ok()
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    UnparseableIdentity(String),
    NotOwner,
    NotAdministrator,
    /// An ownership policy was evaluated without a target resource.
    NoTarget,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::UnparseableIdentity(subject) => {
                write!(f, "caller identity '{subject}' is not a valid owner id")
            }
            DenyReason::NotOwner => f.write_str("caller does not manage this tour"),
            DenyReason::NotAdministrator => f.write_str("administrator role required"),
            DenyReason::NoTarget => f.write_str("no resource to check ownership against"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { policy: Policy, reason: DenyReason },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Evaluate a single policy.
pub fn evaluate(
    policy: Policy,
    caller: &CallerIdentity,
    target: Option<&dyn Owned>,
) -> Result<(), DenyReason> {
    match policy {
        Policy::OwnerMatch => {
            let owner = caller
                .owner_id()
                .ok_or_else(|| DenyReason::UnparseableIdentity(caller.subject.clone()))?;
            let target = target.ok_or(DenyReason::NoTarget)?;
            if target.owner_id() == owner {
                Ok(())
            } else {
                Err(DenyReason::NotOwner)
            }
        }
        Policy::AdministratorRole => {
            if caller.is_admin() {
                Ok(())
            } else {
                Err(DenyReason::NotAdministrator)
            }
        }
    }
}

/// Evaluate every policy in order; all must pass. The first denial wins.
///
/// An empty policy list always allows.
pub fn authorize(
    policies: &[Policy],
    caller: &CallerIdentity,
    target: Option<&dyn Owned>,
) -> Decision {
    for &policy in policies {
        if let Err(reason) = evaluate(policy, caller, target) {
            return Decision::Deny { policy, reason };
        }
    }
    Decision::Allow
}

/// Which tours a list read may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    OwnedBy(EntityId),
}

/// Role branch for collection reads: administrators see everything, anyone
/// else only what their resolved identity owns.
pub fn list_scope(caller: &CallerIdentity) -> Result<ListScope, DenyReason> {
    if caller.is_admin() {
        return Ok(ListScope::All);
    }
    caller
        .owner_id()
        .map(ListScope::OwnedBy)
        .ok_or_else(|| DenyReason::UnparseableIdentity(caller.subject.clone()))
}
