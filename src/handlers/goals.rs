use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use model::entities::goal;
use model::entities::prelude::*;
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

/// Request body for setting a monthly goal
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateGoalRequest {
    pub client_id: i32,
    /// 1-12
    pub month: i32,
    pub year: i32,
    /// Defaults to 22
    pub business_days: Option<i32>,
    pub value: Decimal,
}

/// Request body for updating a goal
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateGoalRequest {
    pub business_days: Option<i32>,
    pub value: Option<Decimal>,
}

/// Goal response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GoalResponse {
    pub id: i32,
    pub client_id: i32,
    pub month: i32,
    pub year: i32,
    pub business_days: i32,
    pub value: Decimal,
}

impl From<goal::Model> for GoalResponse {
    fn from(model: goal::Model) -> Self {
        Self {
            id: model.id,
            client_id: model.client_id,
            month: model.month,
            year: model.year,
            business_days: model.business_days,
            value: model.value,
        }
    }
}

/// Query parameters for the goal listing
#[derive(Debug, Deserialize, ToSchema)]
pub struct GoalListQuery {
    pub client_id: Option<i32>,
    pub year: Option<i32>,
    pub month: Option<i32>,
}

fn validate_month(month: i32) -> Result<(), ApiError> {
    if !(1..=12).contains(&month) {
        return Err(ApiError::bad_request("month must be between 1 and 12"));
    }
    Ok(())
}

/// Set a monthly goal for a client. One goal per client and month.
#[utoipa::path(
    post,
    path = "/api/v1/goals",
    tag = "goals",
    request_body = CreateGoalRequest,
    responses(
        (status = 201, description = "Goal created successfully", body = ApiResponse<GoalResponse>),
        (status = 400, description = "Invalid request or duplicate month", body = ErrorResponse),
        (status = 403, description = "Management access required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn create_goal(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GoalResponse>>), ApiError> {
    identity.require_management()?;
    validate_month(request.month)?;
    if request.value <= Decimal::ZERO {
        return Err(ApiError::bad_request("goal value must be positive"));
    }
    let business_days = request.business_days.unwrap_or(22);
    if business_days < 1 {
        return Err(ApiError::bad_request("business days must be at least 1"));
    }
    Client::find_by_id(request.client_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("client {} not found", request.client_id)))?;

    let duplicate = Goal::find()
        .filter(goal::Column::ClientId.eq(request.client_id))
        .filter(goal::Column::Month.eq(request.month))
        .filter(goal::Column::Year.eq(request.year))
        .one(&state.db)
        .await?;
    if duplicate.is_some() {
        return Err(ApiError::bad_request(
            "a goal already exists for this client and month",
        ));
    }

    let goal = goal::ActiveModel {
        client_id: Set(request.client_id),
        month: Set(request.month),
        year: Set(request.year),
        business_days: Set(business_days),
        value: Set(request.value),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(goal_id = goal.id, client_id = goal.client_id, "goal set");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            GoalResponse::from(goal),
            "Goal created successfully",
        )),
    ))
}

/// List goals, filterable by client and period
#[utoipa::path(
    get,
    path = "/api/v1/goals",
    tag = "goals",
    params(
        ("client_id" = Option<i32>, Query, description = "Client filter"),
        ("year" = Option<i32>, Query, description = "Year filter"),
        ("month" = Option<i32>, Query, description = "Month filter"),
    ),
    responses(
        (status = 200, description = "Goals retrieved successfully", body = ApiResponse<Vec<GoalResponse>>)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_goals(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<GoalListQuery>,
) -> Result<Json<ApiResponse<Vec<GoalResponse>>>, ApiError> {
    let scope = identity.scope(None);

    let mut finder = Goal::find()
        .order_by_asc(goal::Column::Year)
        .order_by_asc(goal::Column::Month);
    if let Some(rep) = scope.owner_filter() {
        let owned: Vec<i32> = Client::find()
            .filter(model::entities::client::Column::RegisteredBy.eq(rep))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        finder = finder.filter(goal::Column::ClientId.is_in(owned));
    }
    if let Some(client_id) = query.client_id {
        finder = finder.filter(goal::Column::ClientId.eq(client_id));
    }
    if let Some(year) = query.year {
        finder = finder.filter(goal::Column::Year.eq(year));
    }
    if let Some(month) = query.month {
        finder = finder.filter(goal::Column::Month.eq(month));
    }

    let goals = finder.all(&state.db).await?;
    Ok(Json(ApiResponse::new(
        goals.into_iter().map(GoalResponse::from).collect::<Vec<_>>(),
        "Goals retrieved successfully",
    )))
}

/// Update a goal's value or business days
#[utoipa::path(
    put,
    path = "/api/v1/goals/{goal_id}",
    tag = "goals",
    params(("goal_id" = i32, Path, description = "Goal ID")),
    request_body = UpdateGoalRequest,
    responses(
        (status = 200, description = "Goal updated successfully", body = ApiResponse<GoalResponse>),
        (status = 404, description = "Goal not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn update_goal(
    State(state): State<AppState>,
    identity: Identity,
    Path(goal_id): Path<i32>,
    Json(request): Json<UpdateGoalRequest>,
) -> Result<Json<ApiResponse<GoalResponse>>, ApiError> {
    identity.require_management()?;
    let goal = Goal::find_by_id(goal_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("goal {goal_id} not found")))?;

    let mut active = goal.into_active_model();
    if let Some(business_days) = request.business_days {
        if business_days < 1 {
            return Err(ApiError::bad_request("business days must be at least 1"));
        }
        active.business_days = Set(business_days);
    }
    if let Some(value) = request.value {
        if value <= Decimal::ZERO {
            return Err(ApiError::bad_request("goal value must be positive"));
        }
        active.value = Set(value);
    }
    let goal = active.update(&state.db).await?;
    Ok(Json(ApiResponse::new(
        GoalResponse::from(goal),
        "Goal updated successfully",
    )))
}

/// Delete a goal
#[utoipa::path(
    delete,
    path = "/api/v1/goals/{goal_id}",
    tag = "goals",
    params(("goal_id" = i32, Path, description = "Goal ID")),
    responses(
        (status = 200, description = "Goal deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "Goal not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn delete_goal(
    State(state): State<AppState>,
    identity: Identity,
    Path(goal_id): Path<i32>,
) -> Result<Json<ApiResponse<i32>>, ApiError> {
    identity.require_management()?;
    let goal = Goal::find_by_id(goal_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("goal {goal_id} not found")))?;
    goal.delete(&state.db).await?;
    Ok(Json(ApiResponse::new(goal_id, "Goal deleted successfully")))
}
