use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use common::{ConversionStats, FunnelOutcome, FunnelSnapshot};
use compute::funnel::{self, CaseChanges, NewCase};
use model::entities::prelude::*;
use model::entities::{prospecting, prospecting_action};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for opening a prospecting case
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateProspectingRequest {
    pub prospect_id: i32,
    pub kind_id: Option<i32>,
    pub duration_months: i32,
    pub trips: i32,
    pub avg_trip_value: Decimal,
}

/// Request body for editing an open case
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateProspectingRequest {
    /// Doubly optional: absent keeps the kind, null clears it
    pub kind_id: Option<Option<i32>>,
    pub duration_months: Option<i32>,
    pub trips: Option<i32>,
    pub avg_trip_value: Option<Decimal>,
}

/// Request body for finalizing a case
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct FinalizeRequest {
    /// CLOSED, ABANDONED or LOST
    pub outcome: FunnelOutcome,
}

/// Prospecting case response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProspectingResponse {
    pub id: i32,
    pub prospect_id: i32,
    pub control_number: Option<String>,
    pub status: String,
    pub kind_id: Option<i32>,
    pub duration_months: i32,
    pub trips: i32,
    pub avg_trip_value: Decimal,
    pub total_value: Decimal,
    pub created_by: i32,
    pub created_at: String,
    /// Days in the current stage; null once the case is finalized
    pub days_in_stage: Option<i64>,
}

impl From<prospecting::Model> for ProspectingResponse {
    fn from(model: prospecting::Model) -> Self {
        let days_in_stage = funnel::days_in_stage(&model, Utc::now());
        Self {
            id: model.id,
            prospect_id: model.prospect_id,
            control_number: model.control_number,
            status: model.status.as_str().to_string(),
            kind_id: model.kind_id,
            duration_months: model.duration_months,
            trips: model.trips,
            avg_trip_value: model.avg_trip_value,
            total_value: model.total_value,
            created_by: model.created_by,
            created_at: model.created_at.to_rfc3339(),
            days_in_stage,
        }
    }
}

/// Prospecting action response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProspectingActionResponse {
    pub id: i32,
    pub prospecting_id: i32,
    pub description: String,
    pub attachment: Option<String>,
    pub recorded_by: i32,
    pub recorded_at: String,
}

impl From<prospecting_action::Model> for ProspectingActionResponse {
    fn from(model: prospecting_action::Model) -> Self {
        Self {
            id: model.id,
            prospecting_id: model.prospecting_id,
            description: model.description,
            attachment: model.attachment,
            recorded_by: model.recorded_by,
            recorded_at: model.recorded_at.to_rfc3339(),
        }
    }
}

/// Funnel board: cases grouped by stage
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FunnelBoardResponse {
    pub new: Vec<ProspectingResponse>,
    pub negotiating: Vec<ProspectingResponse>,
    pub closed: Vec<ProspectingResponse>,
    pub abandoned: Vec<ProspectingResponse>,
    pub lost: Vec<ProspectingResponse>,
}

/// Funnel dashboard: per-status totals plus conversion statistics
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FunnelDashboardResponse {
    pub snapshot: FunnelSnapshot,
    pub conversion: ConversionStats,
}

/// Query parameters for funnel views
#[derive(Debug, Deserialize, ToSchema)]
pub struct FunnelQuery {
    /// Narrow to one representative (honored for management only)
    pub representative: Option<i32>,
}

/// Get the funnel board with cases grouped by stage
#[utoipa::path(
    get,
    path = "/api/v1/prospecting",
    tag = "prospecting",
    params(
        ("representative" = Option<i32>, Query, description = "Representative filter (management only)"),
    ),
    responses(
        (status = 200, description = "Funnel board retrieved successfully", body = ApiResponse<FunnelBoardResponse>)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_funnel_board(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<FunnelQuery>,
) -> Result<Json<ApiResponse<FunnelBoardResponse>>, ApiError> {
    let scope = identity.scope(query.representative);
    let mut finder = Prospecting::find().order_by_asc(prospecting::Column::CreatedAt);
    if let Some(rep) = scope.owner_filter() {
        finder = finder.filter(prospecting::Column::CreatedBy.eq(rep));
    }
    let cases = finder.all(&state.db).await?;

    let mut board = FunnelBoardResponse {
        new: Vec::new(),
        negotiating: Vec::new(),
        closed: Vec::new(),
        abandoned: Vec::new(),
        lost: Vec::new(),
    };
    for case in cases {
        use model::entities::prospecting::FunnelStatus;
        let column = match case.status {
            FunnelStatus::New => &mut board.new,
            FunnelStatus::Negotiating => &mut board.negotiating,
            FunnelStatus::Closed => &mut board.closed,
            FunnelStatus::Abandoned => &mut board.abandoned,
            FunnelStatus::Lost => &mut board.lost,
        };
        column.push(ProspectingResponse::from(case));
    }
    Ok(Json(ApiResponse::new(
        board,
        "Funnel board retrieved successfully",
    )))
}

/// Open a prospecting case
#[utoipa::path(
    post,
    path = "/api/v1/prospecting",
    tag = "prospecting",
    request_body = CreateProspectingRequest,
    responses(
        (status = 201, description = "Case opened", body = ApiResponse<ProspectingResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Prospect not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn create_prospecting(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateProspectingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProspectingResponse>>), ApiError> {
    let case = funnel::create_case(
        &state.db,
        &identity.user,
        NewCase {
            prospect_id: request.prospect_id,
            kind_id: request.kind_id,
            duration_months: request.duration_months,
            trips: request.trips,
            avg_trip_value: request.avg_trip_value,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ProspectingResponse::from(case),
            "Case opened",
        )),
    ))
}

/// Get a single case
#[utoipa::path(
    get,
    path = "/api/v1/prospecting/{case_id}",
    tag = "prospecting",
    params(("case_id" = i32, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Case retrieved successfully", body = ApiResponse<ProspectingResponse>),
        (status = 404, description = "Case not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_prospecting(
    State(state): State<AppState>,
    identity: Identity,
    Path(case_id): Path<i32>,
) -> Result<Json<ApiResponse<ProspectingResponse>>, ApiError> {
    let scope = identity.scope(None);
    let case = funnel::get_case(&state.db, &scope, case_id).await?;
    Ok(Json(ApiResponse::new(
        ProspectingResponse::from(case),
        "Case retrieved successfully",
    )))
}

/// Edit an open case. The total is recomputed and a synthetic action
/// records the diff.
#[utoipa::path(
    put,
    path = "/api/v1/prospecting/{case_id}",
    tag = "prospecting",
    params(("case_id" = i32, Path, description = "Case ID")),
    request_body = UpdateProspectingRequest,
    responses(
        (status = 200, description = "Case updated", body = ApiResponse<ProspectingResponse>),
        (status = 400, description = "Case is finalized", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn update_prospecting(
    State(state): State<AppState>,
    identity: Identity,
    Path(case_id): Path<i32>,
    Json(request): Json<UpdateProspectingRequest>,
) -> Result<Json<ApiResponse<ProspectingResponse>>, ApiError> {
    let scope = identity.scope(None);
    let case = funnel::edit(
        &state.db,
        &scope,
        &identity.user,
        case_id,
        CaseChanges {
            kind_id: request.kind_id,
            duration_months: request.duration_months,
            trips: request.trips,
            avg_trip_value: request.avg_trip_value,
        },
    )
    .await?;
    Ok(Json(ApiResponse::new(
        ProspectingResponse::from(case),
        "Case updated",
    )))
}

/// Move a NEW case to NEGOTIATING
#[utoipa::path(
    post,
    path = "/api/v1/prospecting/{case_id}/start",
    tag = "prospecting",
    params(("case_id" = i32, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Negotiation started", body = ApiResponse<ProspectingResponse>),
        (status = 409, description = "Case is not NEW", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn start_prospecting(
    State(state): State<AppState>,
    identity: Identity,
    Path(case_id): Path<i32>,
) -> Result<Json<ApiResponse<ProspectingResponse>>, ApiError> {
    let scope = identity.scope(None);
    let case = funnel::start(&state.db, &scope, &identity.user, case_id).await?;
    Ok(Json(ApiResponse::new(
        ProspectingResponse::from(case),
        "Negotiation started",
    )))
}

/// Finalize a case to CLOSED, ABANDONED or LOST
#[utoipa::path(
    post,
    path = "/api/v1/prospecting/{case_id}/finalize",
    tag = "prospecting",
    params(("case_id" = i32, Path, description = "Case ID")),
    request_body = FinalizeRequest,
    responses(
        (status = 200, description = "Case finalized", body = ApiResponse<ProspectingResponse>),
        (status = 409, description = "Case is already finalized", body = ErrorResponse),
        (status = 422, description = "Outcome is not a terminal stage", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn finalize_prospecting(
    State(state): State<AppState>,
    identity: Identity,
    Path(case_id): Path<i32>,
    Json(request): Json<FinalizeRequest>,
) -> Result<Json<ApiResponse<ProspectingResponse>>, ApiError> {
    let scope = identity.scope(None);
    let case = funnel::finalize(&state.db, &scope, &identity.user, case_id, request.outcome).await?;
    Ok(Json(ApiResponse::new(
        ProspectingResponse::from(case),
        "Case finalized",
    )))
}

/// Record an action on a case. The first action on a NEW case starts the
/// negotiation.
#[utoipa::path(
    post,
    path = "/api/v1/prospecting/{case_id}/actions",
    tag = "prospecting",
    params(("case_id" = i32, Path, description = "Case ID")),
    request_body = crate::handlers::tasks::RecordActionRequest,
    responses(
        (status = 201, description = "Action recorded", body = ApiResponse<ProspectingActionResponse>),
        (status = 400, description = "Case is finalized", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity, request))]
pub async fn create_prospecting_action(
    State(state): State<AppState>,
    identity: Identity,
    Path(case_id): Path<i32>,
    Json(request): Json<crate::handlers::tasks::RecordActionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProspectingActionResponse>>), ApiError> {
    let scope = identity.scope(None);
    let (_, action) = funnel::record_action(
        &state.db,
        &scope,
        &identity.user,
        case_id,
        request.description,
        request.attachment,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ProspectingActionResponse::from(action),
            "Action recorded",
        )),
    ))
}

/// List a case's actions, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/prospecting/{case_id}/actions",
    tag = "prospecting",
    params(("case_id" = i32, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Actions retrieved successfully", body = ApiResponse<Vec<ProspectingActionResponse>>),
        (status = 404, description = "Case not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_prospecting_actions(
    State(state): State<AppState>,
    identity: Identity,
    Path(case_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ProspectingActionResponse>>>, ApiError> {
    let scope = identity.scope(None);
    let actions = funnel::list_actions(&state.db, &scope, case_id).await?;
    Ok(Json(ApiResponse::new(
        actions
            .into_iter()
            .map(ProspectingActionResponse::from)
            .collect::<Vec<_>>(),
        "Actions retrieved successfully",
    )))
}

/// Get the funnel dashboard: per-status totals and conversion statistics
#[utoipa::path(
    get,
    path = "/api/v1/prospecting/dashboard",
    tag = "prospecting",
    params(
        ("representative" = Option<i32>, Query, description = "Representative filter (management only)"),
    ),
    responses(
        (status = 200, description = "Funnel dashboard retrieved successfully", body = ApiResponse<FunnelDashboardResponse>)
    )
)]
#[instrument(skip(state, identity))]
pub async fn get_funnel_dashboard(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<FunnelQuery>,
) -> Result<Json<ApiResponse<FunnelDashboardResponse>>, ApiError> {
    let scope = identity.scope(query.representative);
    let snapshot = funnel::funnel_snapshot(&state.db, &scope).await?;
    let conversion = funnel::conversion_stats(&state.db, &scope).await?;
    Ok(Json(ApiResponse::new(
        FunnelDashboardResponse { snapshot, conversion },
        "Funnel dashboard retrieved successfully",
    )))
}
