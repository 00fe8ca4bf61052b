use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use model::entities::client;
use model::entities::prelude::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::lookup::normalize_tax_id;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for registering a client
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateClientRequest {
    /// 14-digit tax id, punctuation allowed
    pub tax_id: String,
    pub legal_name: String,
    pub address: String,
    pub contact_name: String,
    pub contact_phone: String,
    /// Owning representative; management only, defaults to the caller
    pub registered_by: Option<i32>,
}

/// Request body for updating a client
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateClientRequest {
    pub tax_id: Option<String>,
    pub legal_name: Option<String>,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
}

/// Client response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    pub id: i32,
    pub tax_id: String,
    pub legal_name: String,
    pub address: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub registered_by: Option<i32>,
    pub registered_at: String,
}

impl From<client::Model> for ClientResponse {
    fn from(model: client::Model) -> Self {
        Self {
            id: model.id,
            tax_id: model.tax_id,
            legal_name: model.legal_name,
            address: model.address,
            contact_name: model.contact_name,
            contact_phone: model.contact_phone,
            registered_by: model.registered_by,
            registered_at: model.registered_at.to_rfc3339(),
        }
    }
}

/// Query parameters for the client listing
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClientListQuery {
    /// Case-insensitive search over legal name and tax id
    pub q: Option<String>,
    /// Narrow to one representative (honored for management only)
    pub representative: Option<i32>,
}

/// Register a new client
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    tag = "clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created successfully", body = ApiResponse<ClientResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn create_client(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClientResponse>>), ApiError> {
    let tax_id = normalize_tax_id(&request.tax_id)
        .ok_or_else(|| ApiError::bad_request("tax id must have exactly 14 digits"))?;
    if request.legal_name.trim().is_empty() {
        return Err(ApiError::bad_request("legal name cannot be empty"));
    }
    let registered_by = match request.registered_by {
        Some(owner) if identity.is_management() => Some(owner),
        // Representatives always own what they register.
        _ => Some(identity.user.id),
    };

    let client = client::ActiveModel {
        tax_id: Set(tax_id),
        legal_name: Set(request.legal_name),
        address: Set(request.address),
        contact_name: Set(request.contact_name),
        contact_phone: Set(request.contact_phone),
        registered_by: Set(registered_by),
        registered_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(client_id = client.id, "client registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ClientResponse::from(client),
            "Client created successfully",
        )),
    ))
}

/// List clients visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    tag = "clients",
    params(
        ("q" = Option<String>, Query, description = "Search over legal name and tax id"),
        ("representative" = Option<i32>, Query, description = "Representative filter (management only)"),
    ),
    responses(
        (status = 200, description = "Clients retrieved successfully", body = ApiResponse<Vec<ClientResponse>>)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_clients(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<ApiResponse<Vec<ClientResponse>>>, ApiError> {
    let scope = identity.scope(query.representative);
    let mut finder = Client::find().order_by_asc(client::Column::LegalName);
    if let Some(rep) = scope.owner_filter() {
        finder = finder.filter(client::Column::RegisteredBy.eq(rep));
    }
    if let Some(q) = query.q.filter(|q| !q.trim().is_empty()) {
        let pattern = format!("%{}%", q.trim());
        finder = finder.filter(
            Condition::any()
                .add(client::Column::LegalName.contains(q.trim()))
                .add(client::Column::TaxId.like(&pattern)),
        );
    }
    let clients = finder.all(&state.db).await?;
    let responses: Vec<ClientResponse> = clients.into_iter().map(ClientResponse::from).collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Clients retrieved successfully",
    )))
}

/// Get a single client
#[utoipa::path(
    get,
    path = "/api/v1/clients/{client_id}",
    tag = "clients",
    params(("client_id" = i32, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client retrieved successfully", body = ApiResponse<ClientResponse>),
        (status = 404, description = "Client not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_client(
    State(state): State<AppState>,
    identity: Identity,
    Path(client_id): Path<i32>,
) -> Result<Json<ApiResponse<ClientResponse>>, ApiError> {
    let scope = identity.scope(None);
    let client = compute::clients::load_visible(&state.db, &scope, client_id).await?;
    Ok(Json(ApiResponse::new(
        ClientResponse::from(client),
        "Client retrieved successfully",
    )))
}

/// Update a client
#[utoipa::path(
    put,
    path = "/api/v1/clients/{client_id}",
    tag = "clients",
    params(("client_id" = i32, Path, description = "Client ID")),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated successfully", body = ApiResponse<ClientResponse>),
        (status = 404, description = "Client not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn update_client(
    State(state): State<AppState>,
    identity: Identity,
    Path(client_id): Path<i32>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<Json<ApiResponse<ClientResponse>>, ApiError> {
    let scope = identity.scope(None);
    let client = compute::clients::load_visible(&state.db, &scope, client_id).await?;

    let mut active = client.into_active_model();
    if let Some(tax_id) = request.tax_id {
        let tax_id = normalize_tax_id(&tax_id)
            .ok_or_else(|| ApiError::bad_request("tax id must have exactly 14 digits"))?;
        active.tax_id = Set(tax_id);
    }
    if let Some(legal_name) = request.legal_name {
        if legal_name.trim().is_empty() {
            return Err(ApiError::bad_request("legal name cannot be empty"));
        }
        active.legal_name = Set(legal_name);
    }
    if let Some(address) = request.address {
        active.address = Set(address);
    }
    if let Some(contact_name) = request.contact_name {
        active.contact_name = Set(contact_name);
    }
    if let Some(contact_phone) = request.contact_phone {
        active.contact_phone = Set(contact_phone);
    }
    let client = active.update(&state.db).await?;
    Ok(Json(ApiResponse::new(
        ClientResponse::from(client),
        "Client updated successfully",
    )))
}

/// Delete a client. Clients with recorded services return 409 with the
/// dependent count.
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{client_id}",
    tag = "clients",
    params(("client_id" = i32, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "Client not found", body = ErrorResponse),
        (status = 409, description = "Client has dependent services", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn delete_client(
    State(state): State<AppState>,
    identity: Identity,
    Path(client_id): Path<i32>,
) -> Result<Json<ApiResponse<i32>>, ApiError> {
    let scope = identity.scope(None);
    compute::clients::delete_client(&state.db, &scope, client_id).await?;
    info!(client_id, "client deleted");
    Ok(Json(ApiResponse::new(
        client_id,
        "Client deleted successfully",
    )))
}
