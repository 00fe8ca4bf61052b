use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use model::entities::prelude::*;
use model::entities::service_kind;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a service kind
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateServiceKindRequest {
    pub name: String,
}

/// Service kind response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceKindResponse {
    pub id: i32,
    pub name: String,
}

impl From<service_kind::Model> for ServiceKindResponse {
    fn from(model: service_kind::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// List service kinds
#[utoipa::path(
    get,
    path = "/api/v1/service-kinds",
    tag = "services",
    responses(
        (status = 200, description = "Service kinds retrieved successfully", body = ApiResponse<Vec<ServiceKindResponse>>)
    )
)]
#[instrument(skip(state, _identity))]
pub async fn get_service_kinds(
    State(state): State<AppState>,
    _identity: Identity,
) -> Result<Json<ApiResponse<Vec<ServiceKindResponse>>>, ApiError> {
    let kinds = ServiceKind::find()
        .order_by_asc(service_kind::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(ApiResponse::new(
        kinds.into_iter().map(ServiceKindResponse::from).collect::<Vec<_>>(),
        "Service kinds retrieved successfully",
    )))
}

/// Create a service kind
#[utoipa::path(
    post,
    path = "/api/v1/service-kinds",
    tag = "services",
    request_body = CreateServiceKindRequest,
    responses(
        (status = 201, description = "Service kind created successfully", body = ApiResponse<ServiceKindResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Management access required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn create_service_kind(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateServiceKindRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ServiceKindResponse>>), ApiError> {
    identity.require_management()?;
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("name cannot be empty"));
    }
    let kind = service_kind::ActiveModel {
        name: Set(request.name),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ServiceKindResponse::from(kind),
            "Service kind created successfully",
        )),
    ))
}
