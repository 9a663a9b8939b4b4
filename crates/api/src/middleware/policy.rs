//! Enforcement of a selected variant's policy list.

use tourline_core::error::CoreError;
use tourline_core::policy::{authorize, Decision};
use tourline_core::tour::Owned;

use super::auth::Caller;
use crate::error::AppError;
use crate::negotiation::Variant;

/// Run every policy attached to `variant` for `caller` against `target`.
///
/// Variants without policies admit anyone, anonymous callers included.
/// Otherwise an anonymous caller gets 401 and a denial gets 403.
pub fn enforce(
    variant: &Variant,
    caller: &Caller,
    target: Option<&dyn Owned>,
) -> Result<(), AppError> {
    if variant.policies.is_empty() {
        return Ok(());
    }
    let identity = caller.require_identity()?;

    match authorize(&variant.policies, identity, target) {
        Decision::Allow => Ok(()),
        Decision::Deny { policy, reason } => {
            tracing::info!(
                variant = variant.name,
                subject = %identity.subject,
                %policy,
                %reason,
                "Request denied by policy"
            );
            Err(AppError::Core(CoreError::Forbidden(format!(
                "{policy} policy not satisfied: {reason}"
            ))))
        }
    }
}
