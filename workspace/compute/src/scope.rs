use model::entities::{profile, user};
use tracing::debug;

/// The slice of CRM data an identity may see.
///
/// Representatives are pinned to their own records. Identities with
/// management access (or the staff flag) see everything and may narrow the
/// view to a single representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Locked to records owned by this user id.
    Representative(i32),
    /// Unrestricted, optionally narrowed to one representative.
    Full { representative: Option<i32> },
}

impl VisibilityScope {
    /// Resolves the scope for a user and their profile.
    ///
    /// A representative cannot widen their view: any `requested_rep` filter
    /// they pass is dropped without error and the scope stays pinned to
    /// their own id.
    pub fn resolve(
        user: &user::Model,
        profile: &profile::Model,
        requested_rep: Option<i32>,
    ) -> Self {
        if user.is_staff || profile.has_management_access() {
            VisibilityScope::Full {
                representative: requested_rep,
            }
        } else {
            if requested_rep.is_some() {
                debug!(
                    user_id = user.id,
                    "representative filter ignored for non-management identity"
                );
            }
            VisibilityScope::Representative(user.id)
        }
    }

    /// Representative id that owner columns must match, if any.
    pub fn owner_filter(&self) -> Option<i32> {
        match *self {
            VisibilityScope::Representative(id) => Some(id),
            VisibilityScope::Full { representative } => representative,
        }
    }

    /// Whether a record owned by `owner` is visible in this scope.
    /// Ownerless records are visible to management only.
    pub fn can_view(&self, owner: Option<i32>) -> bool {
        match *self {
            VisibilityScope::Representative(id) => owner == Some(id),
            VisibilityScope::Full { .. } => true,
        }
    }

    pub fn is_management(&self) -> bool {
        matches!(self, VisibilityScope::Full { .. })
    }
}
