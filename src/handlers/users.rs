use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use model::entities::prelude::*;
use model::entities::profile::{ProfileStatus, Sector};
use model::entities::{profile, user};
use sea_orm::{
    ActiveModelTrait, EntityTrait, IntoActiveModel, ModelTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a user with its profile
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Sector name: REPRESENTATIVE, COMMERCIAL, OPERATIONS_MANAGER, DIRECTORSHIP or ADMIN
    pub sector: String,
    pub is_staff: Option<bool>,
}

/// Request body for updating a user and its profile
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub sector: Option<String>,
    /// ACTIVE or INACTIVE
    pub status: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

/// User response model, flattening the profile
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub sector: String,
    pub status: String,
    pub is_active: bool,
    pub is_staff: bool,
}

impl UserResponse {
    fn from_parts(user: user::Model, profile: profile::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: profile.phone,
            sector: profile.sector.as_str().to_string(),
            status: match profile.status {
                ProfileStatus::Active => "ACTIVE".to_string(),
                ProfileStatus::Inactive => "INACTIVE".to_string(),
            },
            is_active: user.is_active,
            is_staff: user.is_staff,
        }
    }
}

fn parse_sector(raw: &str) -> Result<Sector, ApiError> {
    match raw {
        "REPRESENTATIVE" => Ok(Sector::Representative),
        "COMMERCIAL" => Ok(Sector::Commercial),
        "OPERATIONS_MANAGER" => Ok(Sector::OperationsManager),
        "DIRECTORSHIP" => Ok(Sector::Directorship),
        "ADMIN" => Ok(Sector::Admin),
        other => Err(ApiError::bad_request(format!("unknown sector: {other}"))),
    }
}

fn parse_status(raw: &str) -> Result<ProfileStatus, ApiError> {
    match raw {
        "ACTIVE" => Ok(ProfileStatus::Active),
        "INACTIVE" => Ok(ProfileStatus::Inactive),
        other => Err(ApiError::bad_request(format!("unknown status: {other}"))),
    }
}

/// Create a new user with its profile in one transaction
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Management access required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn create_user(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    identity.require_management()?;
    if request.username.trim().is_empty() {
        return Err(ApiError::bad_request("username cannot be empty"));
    }
    let sector = parse_sector(&request.sector)?;

    let txn = state.db.begin().await?;
    let user = user::ActiveModel {
        username: Set(request.username),
        first_name: Set(request.first_name),
        last_name: Set(request.last_name),
        email: Set(request.email),
        is_active: Set(true),
        is_staff: Set(request.is_staff.unwrap_or(false)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    let profile = profile::ActiveModel {
        user_id: Set(user.id),
        phone: Set(request.phone),
        sector: Set(sector),
        status: Set(ProfileStatus::Active),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(user_id = user.id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            UserResponse::from_parts(user, profile),
            "User created successfully",
        )),
    ))
}

/// List all users with their profiles
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 403, description = "Management access required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_users(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    identity.require_management()?;
    let users = User::find().find_also_related(Profile).all(&state.db).await?;
    let responses: Vec<UserResponse> = users
        .into_iter()
        .filter_map(|(u, p)| Some(UserResponse::from_parts(u, p?)))
        .collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Users retrieved successfully",
    )))
}

/// Get a single user. Non-management callers may only fetch themselves.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_user(
    State(state): State<AppState>,
    identity: Identity,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    if user_id != identity.user.id {
        identity.require_management()?;
    }
    let (user, profile) = User::find_by_id(user_id)
        .find_also_related(Profile)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {user_id} not found")))?;
    let profile =
        profile.ok_or_else(|| ApiError::not_found(format!("user {user_id} has no profile")))?;
    Ok(Json(ApiResponse::new(
        UserResponse::from_parts(user, profile),
        "User retrieved successfully",
    )))
}

/// Update a user and its profile atomically
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn update_user(
    State(state): State<AppState>,
    identity: Identity,
    Path(user_id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    identity.require_management()?;
    let (user, profile) = User::find_by_id(user_id)
        .find_also_related(Profile)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {user_id} not found")))?;
    let profile =
        profile.ok_or_else(|| ApiError::not_found(format!("user {user_id} has no profile")))?;

    let sector = request.sector.as_deref().map(parse_sector).transpose()?;
    let status = request.status.as_deref().map(parse_status).transpose()?;

    let txn = state.db.begin().await?;
    let mut user_active = user.into_active_model();
    if let Some(first_name) = request.first_name {
        user_active.first_name = Set(first_name);
    }
    if let Some(last_name) = request.last_name {
        user_active.last_name = Set(last_name);
    }
    if let Some(email) = request.email {
        user_active.email = Set(Some(email));
    }
    if let Some(is_active) = request.is_active {
        user_active.is_active = Set(is_active);
    }
    if let Some(is_staff) = request.is_staff {
        user_active.is_staff = Set(is_staff);
    }
    let user = user_active.update(&txn).await?;

    let mut profile_active = profile.into_active_model();
    if let Some(phone) = request.phone {
        profile_active.phone = Set(Some(phone));
    }
    if let Some(sector) = sector {
        profile_active.sector = Set(sector);
    }
    if let Some(status) = status {
        profile_active.status = Set(status);
    }
    let profile = profile_active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(ApiResponse::new(
        UserResponse::from_parts(user, profile),
        "User updated successfully",
    )))
}

/// Delete a user. Users referenced by history records are protected.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "User is referenced by other records", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn delete_user(
    State(state): State<AppState>,
    identity: Identity,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<i32>>, ApiError> {
    identity.require_management()?;
    let user = User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {user_id} not found")))?;
    match user.delete(&state.db).await {
        Ok(_) => Ok(Json(ApiResponse::new(
            user_id,
            "User deleted successfully",
        ))),
        Err(err) if err.to_string().contains("FOREIGN KEY") => Err(ApiError::new(
            StatusCode::CONFLICT,
            "PROTECTED",
            "user is referenced by history records and cannot be deleted",
        )),
        Err(err) => Err(err.into()),
    }
}
