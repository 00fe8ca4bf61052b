use axum::extract::{Path, State};
use axum::response::Json;
use tracing::instrument;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::lookup::{normalize_tax_id, LookupOutcome};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Look up a company in the external registry by tax id. Registry
/// failures come back as a `failed` outcome, not as an error.
#[utoipa::path(
    get,
    path = "/api/v1/registry/{tax_id}",
    tag = "registry",
    params(("tax_id" = String, Path, description = "14-digit company tax id, punctuation allowed")),
    responses(
        (status = 200, description = "Lookup completed", body = ApiResponse<LookupOutcome>),
        (status = 400, description = "Malformed tax id", body = ErrorResponse)
    )
)]
#[instrument(skip(state, _identity))]
pub async fn lookup_company(
    State(state): State<AppState>,
    _identity: Identity,
    Path(tax_id): Path<String>,
) -> Result<Json<ApiResponse<LookupOutcome>>, ApiError> {
    let normalized = normalize_tax_id(&tax_id)
        .ok_or_else(|| ApiError::bad_request("tax id must contain exactly 14 digits"))?;
    let outcome = state.registry.lookup(&normalized).await;
    Ok(Json(ApiResponse::new(outcome, "Lookup completed")))
}
