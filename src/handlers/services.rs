use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{NaiveDate, Utc};
use model::entities::prelude::*;
use model::entities::{client, service};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for recording a rendered service
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateServiceRequest {
    pub client_id: i32,
    /// YYYY-MM-DD
    pub service_date: NaiveDate,
    pub quantity: i32,
    /// Total monetary value
    pub value: Decimal,
    pub kind_id: Option<i32>,
}

/// Request body for updating a service
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateServiceRequest {
    pub service_date: Option<NaiveDate>,
    pub quantity: Option<i32>,
    pub value: Option<Decimal>,
    pub kind_id: Option<Option<i32>>,
}

/// Service response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceResponse {
    pub id: i32,
    pub client_id: i32,
    pub closed_by: Option<i32>,
    pub service_date: NaiveDate,
    pub quantity: i32,
    pub value: Decimal,
    pub kind_id: Option<i32>,
}

impl From<service::Model> for ServiceResponse {
    fn from(model: service::Model) -> Self {
        Self {
            id: model.id,
            client_id: model.client_id,
            closed_by: model.closed_by,
            service_date: model.service_date,
            quantity: model.quantity,
            value: model.value,
            kind_id: model.kind_id,
        }
    }
}

/// Query parameters for the service listing
#[derive(Debug, Deserialize, ToSchema)]
pub struct ServiceListQuery {
    pub client_id: Option<i32>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Narrow to one representative's clients (honored for management only)
    pub representative: Option<i32>,
}

/// Record a rendered service. Management only.
#[utoipa::path(
    post,
    path = "/api/v1/services",
    tag = "services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service recorded successfully", body = ApiResponse<ServiceResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Management access required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn create_service(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ServiceResponse>>), ApiError> {
    identity.require_management()?;
    if request.quantity < 1 {
        return Err(ApiError::bad_request("quantity must be at least 1"));
    }
    if request.value < Decimal::ZERO {
        return Err(ApiError::bad_request("value cannot be negative"));
    }
    Client::find_by_id(request.client_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("client {} not found", request.client_id)))?;

    let service = service::ActiveModel {
        client_id: Set(request.client_id),
        closed_by: Set(Some(identity.user.id)),
        service_date: Set(request.service_date),
        quantity: Set(request.quantity),
        value: Set(request.value),
        kind_id: Set(request.kind_id),
        recorded_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(service_id = service.id, client_id = service.client_id, "service recorded");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ServiceResponse::from(service),
            "Service recorded successfully",
        )),
    ))
}

/// List services visible to the caller, filterable by client and period
#[utoipa::path(
    get,
    path = "/api/v1/services",
    tag = "services",
    params(
        ("client_id" = Option<i32>, Query, description = "Client filter"),
        ("year" = Option<i32>, Query, description = "Year filter"),
        ("month" = Option<u32>, Query, description = "Month filter, requires year"),
        ("representative" = Option<i32>, Query, description = "Representative filter (management only)"),
    ),
    responses(
        (status = 200, description = "Services retrieved successfully", body = ApiResponse<Vec<ServiceResponse>>),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_services(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ServiceListQuery>,
) -> Result<Json<ApiResponse<Vec<ServiceResponse>>>, ApiError> {
    let scope = identity.scope(query.representative);

    let mut finder = Service::find().order_by_desc(service::Column::ServiceDate);
    if let Some(rep) = scope.owner_filter() {
        let owned: Vec<i32> = Client::find()
            .filter(client::Column::RegisteredBy.eq(rep))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        finder = finder.filter(service::Column::ClientId.is_in(owned));
    }
    if let Some(client_id) = query.client_id {
        finder = finder.filter(service::Column::ClientId.eq(client_id));
    }
    match (query.year, query.month) {
        (Some(year), Some(month)) => {
            let first = NaiveDate::from_ymd_opt(year, month, 1)
                .ok_or_else(|| ApiError::bad_request("invalid year/month filter"))?;
            let last = common::last_day_of_month(year, month)
                .ok_or_else(|| ApiError::bad_request("invalid year/month filter"))?;
            finder = finder.filter(service::Column::ServiceDate.between(first, last));
        }
        (Some(year), None) => {
            let first = NaiveDate::from_ymd_opt(year, 1, 1)
                .ok_or_else(|| ApiError::bad_request("invalid year filter"))?;
            let last = NaiveDate::from_ymd_opt(year, 12, 31)
                .ok_or_else(|| ApiError::bad_request("invalid year filter"))?;
            finder = finder.filter(service::Column::ServiceDate.between(first, last));
        }
        (None, Some(_)) => {
            return Err(ApiError::bad_request("month filter requires a year"));
        }
        (None, None) => {}
    }

    let services = finder.all(&state.db).await?;
    Ok(Json(ApiResponse::new(
        services.into_iter().map(ServiceResponse::from).collect::<Vec<_>>(),
        "Services retrieved successfully",
    )))
}

async fn load_visible(
    state: &AppState,
    identity: &Identity,
    service_id: i32,
) -> Result<service::Model, ApiError> {
    let service = Service::find_by_id(service_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("service {service_id} not found")))?;
    // Visibility follows the owning client.
    compute::clients::load_visible(&state.db, &identity.scope(None), service.client_id).await?;
    Ok(service)
}

/// Get a single service
#[utoipa::path(
    get,
    path = "/api/v1/services/{service_id}",
    tag = "services",
    params(("service_id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service retrieved successfully", body = ApiResponse<ServiceResponse>),
        (status = 404, description = "Service not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_service(
    State(state): State<AppState>,
    identity: Identity,
    Path(service_id): Path<i32>,
) -> Result<Json<ApiResponse<ServiceResponse>>, ApiError> {
    let service = load_visible(&state, &identity, service_id).await?;
    Ok(Json(ApiResponse::new(
        ServiceResponse::from(service),
        "Service retrieved successfully",
    )))
}

/// Update a service. Management only.
#[utoipa::path(
    put,
    path = "/api/v1/services/{service_id}",
    tag = "services",
    params(("service_id" = i32, Path, description = "Service ID")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated successfully", body = ApiResponse<ServiceResponse>),
        (status = 404, description = "Service not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn update_service(
    State(state): State<AppState>,
    identity: Identity,
    Path(service_id): Path<i32>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<ApiResponse<ServiceResponse>>, ApiError> {
    identity.require_management()?;
    let service = load_visible(&state, &identity, service_id).await?;

    let mut active = service.into_active_model();
    if let Some(service_date) = request.service_date {
        active.service_date = Set(service_date);
    }
    if let Some(quantity) = request.quantity {
        if quantity < 1 {
            return Err(ApiError::bad_request("quantity must be at least 1"));
        }
        active.quantity = Set(quantity);
    }
    if let Some(value) = request.value {
        if value < Decimal::ZERO {
            return Err(ApiError::bad_request("value cannot be negative"));
        }
        active.value = Set(value);
    }
    if let Some(kind_id) = request.kind_id {
        active.kind_id = Set(kind_id);
    }
    let service = active.update(&state.db).await?;
    Ok(Json(ApiResponse::new(
        ServiceResponse::from(service),
        "Service updated successfully",
    )))
}

/// Delete a service. Management only.
#[utoipa::path(
    delete,
    path = "/api/v1/services/{service_id}",
    tag = "services",
    params(("service_id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "Service not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn delete_service(
    State(state): State<AppState>,
    identity: Identity,
    Path(service_id): Path<i32>,
) -> Result<Json<ApiResponse<i32>>, ApiError> {
    identity.require_management()?;
    let service = load_visible(&state, &identity, service_id).await?;
    service.delete(&state.db).await?;
    Ok(Json(ApiResponse::new(
        service_id,
        "Service deleted successfully",
    )))
}
