//! Role-based access control.
//!
//! Two layers guard every mutation. The static [`policy`] table decides
//! whether a role may call a route category at all, and runs as middleware
//! before the handler. The [`ownership`] checks then compare the loaded
//! resource's manager/participant relation against the caller.

pub mod ownership;
pub mod policy;

pub use ownership::{Guarded, OwnershipRule, Relation, TaskGuard, check_ownership};
pub use policy::{Action, POLICY, allowed_roles, is_allowed};
