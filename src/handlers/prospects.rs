use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use compute::promotion::{self, PromotionDetails};
use model::entities::prelude::*;
use model::entities::prospect;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::handlers::clients::ClientResponse;
use crate::identity::Identity;
use crate::lookup::normalize_tax_id;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for registering a prospect
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateProspectRequest {
    /// Optional at this stage; required when promoting
    pub tax_id: Option<String>,
    pub legal_name: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
}

/// Request body for updating a prospect
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateProspectRequest {
    pub tax_id: Option<String>,
    pub legal_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

/// Request body for promoting a prospect to a client
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PromoteProspectRequest {
    /// Client address, collected at promotion time
    pub address: String,
    /// Overrides the prospect's tax id
    pub tax_id: Option<String>,
}

/// Prospect response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProspectResponse {
    pub id: i32,
    pub tax_id: Option<String>,
    pub legal_name: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub registered_by: i32,
    pub registered_at: String,
}

impl From<prospect::Model> for ProspectResponse {
    fn from(model: prospect::Model) -> Self {
        Self {
            id: model.id,
            tax_id: model.tax_id,
            legal_name: model.legal_name,
            contact_name: model.contact_name,
            contact_phone: model.contact_phone,
            contact_email: model.contact_email,
            registered_by: model.registered_by,
            registered_at: model.registered_at.to_rfc3339(),
        }
    }
}

async fn load_visible(
    state: &AppState,
    identity: &Identity,
    prospect_id: i32,
) -> Result<prospect::Model, ApiError> {
    let prospect = Prospect::find_by_id(prospect_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("prospect {prospect_id} not found")))?;
    if !identity.scope(None).can_view(Some(prospect.registered_by)) {
        return Err(ApiError::forbidden(
            "prospect belongs to another representative",
        ));
    }
    Ok(prospect)
}

/// Register a new prospect
#[utoipa::path(
    post,
    path = "/api/v1/prospects",
    tag = "prospects",
    request_body = CreateProspectRequest,
    responses(
        (status = 201, description = "Prospect created successfully", body = ApiResponse<ProspectResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn create_prospect(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateProspectRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProspectResponse>>), ApiError> {
    if request.legal_name.trim().is_empty() {
        return Err(ApiError::bad_request("legal name cannot be empty"));
    }
    let tax_id = request
        .tax_id
        .map(|raw| {
            normalize_tax_id(&raw)
                .ok_or_else(|| ApiError::bad_request("tax id must have exactly 14 digits"))
        })
        .transpose()?;

    let prospect = prospect::ActiveModel {
        tax_id: Set(tax_id),
        legal_name: Set(request.legal_name),
        contact_name: Set(request.contact_name),
        contact_phone: Set(request.contact_phone),
        contact_email: Set(request.contact_email),
        registered_by: Set(identity.user.id),
        registered_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(prospect_id = prospect.id, "prospect registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ProspectResponse::from(prospect),
            "Prospect created successfully",
        )),
    ))
}

/// Query parameters for the prospect listing
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProspectListQuery {
    /// Narrow to one representative (honored for management only)
    pub representative: Option<i32>,
}

/// List prospects visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/prospects",
    tag = "prospects",
    params(
        ("representative" = Option<i32>, Query, description = "Representative filter (management only)"),
    ),
    responses(
        (status = 200, description = "Prospects retrieved successfully", body = ApiResponse<Vec<ProspectResponse>>)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_prospects(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ProspectListQuery>,
) -> Result<Json<ApiResponse<Vec<ProspectResponse>>>, ApiError> {
    let scope = identity.scope(query.representative);
    let mut finder = Prospect::find().order_by_asc(prospect::Column::LegalName);
    if let Some(rep) = scope.owner_filter() {
        finder = finder.filter(prospect::Column::RegisteredBy.eq(rep));
    }
    let prospects = finder.all(&state.db).await?;
    let responses: Vec<ProspectResponse> =
        prospects.into_iter().map(ProspectResponse::from).collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Prospects retrieved successfully",
    )))
}

/// Get a single prospect
#[utoipa::path(
    get,
    path = "/api/v1/prospects/{prospect_id}",
    tag = "prospects",
    params(("prospect_id" = i32, Path, description = "Prospect ID")),
    responses(
        (status = 200, description = "Prospect retrieved successfully", body = ApiResponse<ProspectResponse>),
        (status = 404, description = "Prospect not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_prospect(
    State(state): State<AppState>,
    identity: Identity,
    Path(prospect_id): Path<i32>,
) -> Result<Json<ApiResponse<ProspectResponse>>, ApiError> {
    let prospect = load_visible(&state, &identity, prospect_id).await?;
    Ok(Json(ApiResponse::new(
        ProspectResponse::from(prospect),
        "Prospect retrieved successfully",
    )))
}

/// Update a prospect
#[utoipa::path(
    put,
    path = "/api/v1/prospects/{prospect_id}",
    tag = "prospects",
    params(("prospect_id" = i32, Path, description = "Prospect ID")),
    request_body = UpdateProspectRequest,
    responses(
        (status = 200, description = "Prospect updated successfully", body = ApiResponse<ProspectResponse>),
        (status = 404, description = "Prospect not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn update_prospect(
    State(state): State<AppState>,
    identity: Identity,
    Path(prospect_id): Path<i32>,
    Json(request): Json<UpdateProspectRequest>,
) -> Result<Json<ApiResponse<ProspectResponse>>, ApiError> {
    let prospect = load_visible(&state, &identity, prospect_id).await?;

    let mut active = prospect.into_active_model();
    if let Some(raw) = request.tax_id {
        let tax_id = normalize_tax_id(&raw)
            .ok_or_else(|| ApiError::bad_request("tax id must have exactly 14 digits"))?;
        active.tax_id = Set(Some(tax_id));
    }
    if let Some(legal_name) = request.legal_name {
        if legal_name.trim().is_empty() {
            return Err(ApiError::bad_request("legal name cannot be empty"));
        }
        active.legal_name = Set(legal_name);
    }
    if let Some(contact_name) = request.contact_name {
        active.contact_name = Set(contact_name);
    }
    if let Some(contact_phone) = request.contact_phone {
        active.contact_phone = Set(contact_phone);
    }
    if let Some(contact_email) = request.contact_email {
        active.contact_email = Set(Some(contact_email));
    }
    let prospect = active.update(&state.db).await?;
    Ok(Json(ApiResponse::new(
        ProspectResponse::from(prospect),
        "Prospect updated successfully",
    )))
}

/// Delete a prospect
#[utoipa::path(
    delete,
    path = "/api/v1/prospects/{prospect_id}",
    tag = "prospects",
    params(("prospect_id" = i32, Path, description = "Prospect ID")),
    responses(
        (status = 200, description = "Prospect deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "Prospect not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn delete_prospect(
    State(state): State<AppState>,
    identity: Identity,
    Path(prospect_id): Path<i32>,
) -> Result<Json<ApiResponse<i32>>, ApiError> {
    let prospect = load_visible(&state, &identity, prospect_id).await?;
    prospect.delete(&state.db).await?;
    info!(prospect_id, "prospect deleted");
    Ok(Json(ApiResponse::new(
        prospect_id,
        "Prospect deleted successfully",
    )))
}

/// Promote a prospect to a client. One transaction: the client row is
/// created and the prospect removed, or neither happens.
#[utoipa::path(
    post,
    path = "/api/v1/prospects/{prospect_id}/promote",
    tag = "prospects",
    params(("prospect_id" = i32, Path, description = "Prospect ID")),
    request_body = PromoteProspectRequest,
    responses(
        (status = 201, description = "Prospect promoted to client", body = ApiResponse<ClientResponse>),
        (status = 400, description = "Prospect is missing required data", body = ErrorResponse),
        (status = 404, description = "Prospect not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn promote_prospect(
    State(state): State<AppState>,
    identity: Identity,
    Path(prospect_id): Path<i32>,
    Json(request): Json<PromoteProspectRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClientResponse>>), ApiError> {
    let tax_id = request
        .tax_id
        .map(|raw| {
            normalize_tax_id(&raw)
                .ok_or_else(|| ApiError::bad_request("tax id must have exactly 14 digits"))
        })
        .transpose()?;
    let scope = identity.scope(None);
    let client = promotion::promote(
        &state.db,
        &scope,
        prospect_id,
        PromotionDetails {
            address: request.address,
            tax_id,
        },
    )
    .await?;
    info!(prospect_id, client_id = client.id, "prospect promoted");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ClientResponse::from(client),
            "Prospect promoted to client",
        )),
    ))
}
