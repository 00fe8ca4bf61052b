//! Caller identity. Authentication itself lives in the upstream gateway;
//! this service trusts the `X-User-Id` header it injects and loads the
//! user and profile behind it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use compute::VisibilityScope;
use model::entities::prelude::*;
use model::entities::profile::ProfileStatus;
use model::entities::{profile, user};
use sea_orm::EntityTrait;
use tracing::debug;

use crate::error::ApiError;
use crate::schemas::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller: user record plus its profile.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: user::Model,
    pub profile: profile::Model,
}

impl Identity {
    /// Visibility scope for this caller, honoring a requested
    /// representative filter only for management identities.
    pub fn scope(&self, requested_rep: Option<i32>) -> VisibilityScope {
        VisibilityScope::resolve(&self.user, &self.profile, requested_rep)
    }

    pub fn is_management(&self) -> bool {
        self.user.is_staff || self.profile.has_management_access()
    }

    /// Guard for management-only routes.
    pub fn require_management(&self) -> Result<(), ApiError> {
        if self.is_management() {
            Ok(())
        } else {
            Err(ApiError::forbidden(
                "this operation requires management access",
            ))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("missing X-User-Id header"))?
            .to_str()
            .map_err(|_| ApiError::unauthorized("malformed X-User-Id header"))?;
        let user_id: i32 = raw
            .parse()
            .map_err(|_| ApiError::unauthorized("malformed X-User-Id header"))?;

        let Some((user, profile)) = User::find_by_id(user_id)
            .find_also_related(Profile)
            .one(&state.db)
            .await?
        else {
            return Err(ApiError::unauthorized("unknown user"));
        };
        let profile = profile.ok_or_else(|| ApiError::unauthorized("user has no profile"))?;

        if !user.is_active || profile.status != ProfileStatus::Active {
            return Err(ApiError::forbidden("user is inactive"));
        }

        debug!(user_id, sector = profile.sector.as_str(), "resolved identity");
        Ok(Identity { user, profile })
    }
}
