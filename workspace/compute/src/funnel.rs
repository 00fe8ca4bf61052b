//! Prospecting funnel state machine.
//!
//! Cases move NEW -> NEGOTIATING -> {CLOSED | ABANDONED | LOST}. Every
//! mutation checks visibility first and runs entity update plus action
//! insert inside one transaction, so the audit trail never drifts from
//! the case it describes.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use common::{ConversionStats, FunnelOutcome, FunnelSnapshot, RepresentativeClosedTotal};
use model::entities::prelude::*;
use model::entities::prospecting::FunnelStatus;
use model::entities::{prospecting, prospecting_action, user};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument};

use crate::error::{CoreError, Result};
use crate::scope::VisibilityScope;

/// Input for opening a new prospecting case.
#[derive(Debug, Clone)]
pub struct NewCase {
    pub prospect_id: i32,
    pub kind_id: Option<i32>,
    pub duration_months: i32,
    pub trips: i32,
    pub avg_trip_value: Decimal,
}

/// Partial update applied by `edit`. `None` fields keep their value;
/// `kind_id` is doubly optional so the kind can be cleared.
#[derive(Debug, Clone, Default)]
pub struct CaseChanges {
    pub kind_id: Option<Option<i32>>,
    pub duration_months: Option<i32>,
    pub trips: Option<i32>,
    pub avg_trip_value: Option<Decimal>,
}

/// Next control number for `year`, `PROSPEC-{year}/{seq:05}`.
///
/// Max-scan over the year's existing numbers, run inside the caller's
/// insert transaction. The unique index on the column is the backstop:
/// a concurrent duplicate surfaces as a database error instead of being
/// silently renumbered.
async fn next_control_number<C: ConnectionTrait>(db: &C, year: i32) -> Result<String> {
    let prefix = format!("PROSPEC-{year}/");
    let existing = Prospecting::find()
        .filter(prospecting::Column::ControlNumber.starts_with(&prefix))
        .all(db)
        .await?;
    let max_seq = existing
        .iter()
        .filter_map(|c| c.control_number.as_deref())
        .filter_map(|n| n.rsplit('/').next())
        .filter_map(|s| s.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    Ok(format!("{}{:05}", prefix, max_seq + 1))
}

async fn load_visible<C: ConnectionTrait>(
    db: &C,
    scope: &VisibilityScope,
    id: i32,
) -> Result<prospecting::Model> {
    let case = Prospecting::find_by_id(id)
        .one(db)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "prospecting case",
            id,
        })?;
    if !scope.can_view(Some(case.created_by)) {
        return Err(CoreError::AccessDenied(format!(
            "prospecting case {id} belongs to another representative"
        )));
    }
    Ok(case)
}

fn ensure_open(case: &prospecting::Model) -> Result<()> {
    if case.status.is_final() {
        return Err(CoreError::Validation(format!(
            "prospecting case {} is finalized as {}",
            case.id,
            case.status.as_str()
        )));
    }
    Ok(())
}

/// Opens a case in NEW with its control number assigned atomically.
#[instrument(skip(db, actor), fields(actor_id = actor.id))]
pub async fn create_case(
    db: &DatabaseConnection,
    actor: &user::Model,
    input: NewCase,
) -> Result<prospecting::Model> {
    if input.trips < 1 {
        return Err(CoreError::Validation("trips must be at least 1".to_string()));
    }
    if input.duration_months < 1 {
        return Err(CoreError::Validation(
            "duration must be at least one month".to_string(),
        ));
    }
    if input.avg_trip_value < Decimal::ZERO {
        return Err(CoreError::Validation(
            "average trip value cannot be negative".to_string(),
        ));
    }
    Prospect::find_by_id(input.prospect_id)
        .one(db)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "prospect",
            id: input.prospect_id,
        })?;

    let now = Utc::now();
    let txn = db.begin().await?;
    let control_number = next_control_number(&txn, now.year()).await?;
    let case = prospecting::ActiveModel {
        prospect_id: Set(input.prospect_id),
        control_number: Set(Some(control_number.clone())),
        status: Set(FunnelStatus::New),
        kind_id: Set(input.kind_id),
        duration_months: Set(input.duration_months),
        trips: Set(input.trips),
        avg_trip_value: Set(input.avg_trip_value),
        total_value: Set(Decimal::from(input.trips) * input.avg_trip_value),
        created_by: Set(actor.id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(case_id = case.id, %control_number, "opened prospecting case");
    Ok(case)
}

/// NEW -> NEGOTIATING, stamping the actor and timestamp.
#[instrument(skip(db, scope, actor), fields(actor_id = actor.id))]
pub async fn start(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    actor: &user::Model,
    id: i32,
) -> Result<prospecting::Model> {
    let case = load_visible(db, scope, id).await?;
    if case.status != FunnelStatus::New {
        return Err(CoreError::InvalidTransition {
            from: case.status.as_str().to_string(),
            to: FunnelStatus::Negotiating.as_str().to_string(),
        });
    }
    let mut active = case.into_active_model();
    active.status = Set(FunnelStatus::Negotiating);
    active.started_by = Set(Some(actor.id));
    active.negotiation_started_at = Set(Some(Utc::now()));
    Ok(active.update(db).await?)
}

/// Moves an open case to its terminal outcome. Finalized cases stay put.
#[instrument(skip(db, scope, actor), fields(actor_id = actor.id))]
pub async fn finalize(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    actor: &user::Model,
    id: i32,
    outcome: FunnelOutcome,
) -> Result<prospecting::Model> {
    let case = load_visible(db, scope, id).await?;
    let target = match outcome {
        FunnelOutcome::Closed => FunnelStatus::Closed,
        FunnelOutcome::Abandoned => FunnelStatus::Abandoned,
        FunnelOutcome::Lost => FunnelStatus::Lost,
    };
    if case.status.is_final() {
        return Err(CoreError::InvalidTransition {
            from: case.status.as_str().to_string(),
            to: target.as_str().to_string(),
        });
    }
    let mut active = case.into_active_model();
    active.status = Set(target);
    active.finalized_by = Set(Some(actor.id));
    active.finalized_at = Set(Some(Utc::now()));
    let case = active.update(db).await?;
    info!(case_id = case.id, outcome = target.as_str(), "finalized prospecting case");
    Ok(case)
}

/// Records a follow-up action. The first action on a NEW case moves it to
/// NEGOTIATING; later actions leave the stamps untouched.
#[instrument(skip(db, scope, actor, description, attachment), fields(actor_id = actor.id))]
pub async fn record_action(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    actor: &user::Model,
    id: i32,
    description: String,
    attachment: Option<String>,
) -> Result<(prospecting::Model, prospecting_action::Model)> {
    let case = load_visible(db, scope, id).await?;
    ensure_open(&case)?;

    let now = Utc::now();
    let txn = db.begin().await?;
    let action = prospecting_action::ActiveModel {
        prospecting_id: Set(case.id),
        description: Set(description),
        attachment: Set(attachment),
        recorded_by: Set(actor.id),
        recorded_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let case = if case.status == FunnelStatus::New {
        debug!(case_id = case.id, "first action, moving case to NEGOTIATING");
        let mut active = case.into_active_model();
        active.status = Set(FunnelStatus::Negotiating);
        active.started_by = Set(Some(actor.id));
        active.negotiation_started_at = Set(Some(now));
        active.update(&txn).await?
    } else {
        case
    };
    txn.commit().await?;
    Ok((case, action))
}

/// Applies a partial edit to an open case, recomputing the total and
/// leaving a synthetic action describing what changed.
#[instrument(skip(db, scope, actor, changes), fields(actor_id = actor.id))]
pub async fn edit(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    actor: &user::Model,
    id: i32,
    changes: CaseChanges,
) -> Result<prospecting::Model> {
    let case = load_visible(db, scope, id).await?;
    ensure_open(&case)?;

    let mut diffs: Vec<String> = Vec::new();
    let mut active = case.clone().into_active_model();

    if let Some(kind_id) = changes.kind_id {
        if kind_id != case.kind_id {
            diffs.push(format!("kind: {:?} -> {:?}", case.kind_id, kind_id));
            active.kind_id = Set(kind_id);
        }
    }
    if let Some(duration) = changes.duration_months {
        if duration < 1 {
            return Err(CoreError::Validation(
                "duration must be at least one month".to_string(),
            ));
        }
        if duration != case.duration_months {
            diffs.push(format!(
                "duration_months: {} -> {}",
                case.duration_months, duration
            ));
            active.duration_months = Set(duration);
        }
    }
    let trips = changes.trips.unwrap_or(case.trips);
    if trips < 1 {
        return Err(CoreError::Validation("trips must be at least 1".to_string()));
    }
    let avg = changes.avg_trip_value.unwrap_or(case.avg_trip_value);
    if avg < Decimal::ZERO {
        return Err(CoreError::Validation(
            "average trip value cannot be negative".to_string(),
        ));
    }
    if trips != case.trips {
        diffs.push(format!("trips: {} -> {}", case.trips, trips));
        active.trips = Set(trips);
    }
    if avg != case.avg_trip_value {
        diffs.push(format!("avg_trip_value: {} -> {}", case.avg_trip_value, avg));
        active.avg_trip_value = Set(avg);
    }
    let total = Decimal::from(trips) * avg;
    if total != case.total_value {
        diffs.push(format!("total_value: {} -> {}", case.total_value, total));
        active.total_value = Set(total);
    }

    if diffs.is_empty() {
        return Ok(case);
    }

    let txn = db.begin().await?;
    let updated = active.update(&txn).await?;
    prospecting_action::ActiveModel {
        prospecting_id: Set(updated.id),
        description: Set(format!("Updated: {}", diffs.join("; "))),
        attachment: Set(None),
        recorded_by: Set(actor.id),
        recorded_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    Ok(updated)
}

/// Visible read of a single case.
pub async fn get_case(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    id: i32,
) -> Result<prospecting::Model> {
    load_visible(db, scope, id).await
}

/// Action history of a case, oldest first. Includes the synthetic diff
/// actions written by `edit`.
pub async fn list_actions(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    id: i32,
) -> Result<Vec<prospecting_action::Model>> {
    let case = load_visible(db, scope, id).await?;
    Ok(ProspectingAction::find()
        .filter(prospecting_action::Column::ProspectingId.eq(case.id))
        .order_by_asc(prospecting_action::Column::RecordedAt)
        .all(db)
        .await?)
}

/// Days the case has spent in its current stage. Only meaningful while
/// the case is open; finalized cases have no current stage.
pub fn days_in_stage(case: &prospecting::Model, now: DateTime<Utc>) -> Option<i64> {
    if case.status.is_final() {
        return None;
    }
    let anchor = if case.status == FunnelStatus::Negotiating {
        case.negotiation_started_at.unwrap_or(case.created_at)
    } else {
        case.created_at
    };
    Some((now - anchor).num_days().max(0))
}

/// Per-status counts and values plus closed totals per representative.
#[instrument(skip(db, scope))]
pub async fn funnel_snapshot(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
) -> Result<FunnelSnapshot> {
    let cases = scoped_cases(db, scope).await?;

    let mut snapshot = FunnelSnapshot {
        new_count: 0,
        negotiating_count: 0,
        closed_count: 0,
        abandoned_count: 0,
        lost_count: 0,
        open_value: Decimal::ZERO,
        closed_value: Decimal::ZERO,
        closed_by_representative: Vec::new(),
    };
    let mut closed_by_rep: HashMap<i32, (u64, Decimal)> = HashMap::new();
    for case in &cases {
        match case.status {
            FunnelStatus::New => snapshot.new_count += 1,
            FunnelStatus::Negotiating => snapshot.negotiating_count += 1,
            FunnelStatus::Closed => snapshot.closed_count += 1,
            FunnelStatus::Abandoned => snapshot.abandoned_count += 1,
            FunnelStatus::Lost => snapshot.lost_count += 1,
        }
        if case.status.is_open() {
            snapshot.open_value += case.total_value;
        } else if case.status == FunnelStatus::Closed {
            snapshot.closed_value += case.total_value;
            let entry = closed_by_rep.entry(case.created_by).or_default();
            entry.0 += 1;
            entry.1 += case.total_value;
        }
    }

    if !closed_by_rep.is_empty() {
        let ids: Vec<i32> = closed_by_rep.keys().copied().collect();
        let users = User::find()
            .filter(user::Column::Id.is_in(ids))
            .all(db)
            .await?;
        let names: HashMap<i32, String> =
            users.into_iter().map(|u| (u.id, u.full_name())).collect();
        let mut totals: Vec<RepresentativeClosedTotal> = closed_by_rep
            .into_iter()
            .map(|(user_id, (closed_count, closed_value))| RepresentativeClosedTotal {
                user_id,
                name: names.get(&user_id).cloned().unwrap_or_default(),
                closed_count,
                closed_value,
            })
            .collect();
        totals.sort_by(|a, b| b.closed_value.cmp(&a.closed_value));
        snapshot.closed_by_representative = totals;
    }
    Ok(snapshot)
}

/// Closed share of finalized cases.
#[instrument(skip(db, scope))]
pub async fn conversion_stats(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
) -> Result<ConversionStats> {
    let cases = scoped_cases(db, scope).await?;
    let finalized: Vec<&prospecting::Model> =
        cases.iter().filter(|c| c.status.is_final()).collect();
    let finalized_count = finalized.len() as u64;
    let closed_count = finalized
        .iter()
        .filter(|c| c.status == FunnelStatus::Closed)
        .count() as u64;
    Ok(ConversionStats {
        finalized_count,
        closed_count,
        conversion_rate: (finalized_count > 0)
            .then(|| closed_count as f64 / finalized_count as f64),
    })
}

async fn scoped_cases(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
) -> Result<Vec<prospecting::Model>> {
    let mut query = Prospecting::find();
    if let Some(rep) = scope.owner_filter() {
        query = query.filter(prospecting::Column::CreatedBy.eq(rep));
    }
    Ok(query.all(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use model::entities::profile::Sector;

    async fn seed_case(
        db: &DatabaseConnection,
        actor: &user::Model,
        prospect_id: i32,
    ) -> prospecting::Model {
        create_case(
            db,
            actor,
            NewCase {
                prospect_id,
                kind_id: None,
                duration_months: 6,
                trips: 4,
                avg_trip_value: "1000.00".parse().unwrap(),
            },
        )
        .await
        .unwrap()
    }

    fn full_scope() -> VisibilityScope {
        VisibilityScope::Full {
            representative: None,
        }
    }

    #[tokio::test]
    async fn control_numbers_are_sequential_per_year() {
        let db = setup_db().await;
        let (rep, _) = seed_user(&db, "rep", Sector::Representative, false).await;
        let prospect = seed_prospect(&db, "Lead Co", rep.id).await;
        let year = Utc::now().year();

        let first = seed_case(&db, &rep, prospect.id).await;
        let second = seed_case(&db, &rep, prospect.id).await;
        assert_eq!(
            first.control_number.as_deref(),
            Some(format!("PROSPEC-{year}/00001").as_str())
        );
        assert_eq!(
            second.control_number.as_deref(),
            Some(format!("PROSPEC-{year}/00002").as_str())
        );
        assert_eq!(first.total_value, Decimal::from(4000));
        assert_eq!(first.status, FunnelStatus::New);
    }

    #[tokio::test]
    async fn first_action_auto_starts_exactly_once() {
        let db = setup_db().await;
        let (rep, _) = seed_user(&db, "rep", Sector::Representative, false).await;
        let (other, _) = seed_user(&db, "other", Sector::Commercial, false).await;
        let prospect = seed_prospect(&db, "Lead Co", rep.id).await;
        let case = seed_case(&db, &rep, prospect.id).await;

        let scope = full_scope();
        let (case, _) = record_action(&db, &scope, &rep, case.id, "first call".into(), None)
            .await
            .unwrap();
        assert_eq!(case.status, FunnelStatus::Negotiating);
        assert_eq!(case.started_by, Some(rep.id));
        let started_at = case.negotiation_started_at.unwrap();

        let (case, _) = record_action(&db, &scope, &other, case.id, "follow-up".into(), None)
            .await
            .unwrap();
        assert_eq!(case.status, FunnelStatus::Negotiating);
        assert_eq!(case.started_by, Some(rep.id));
        assert_eq!(case.negotiation_started_at, Some(started_at));
    }

    #[tokio::test]
    async fn start_rejects_non_new_case() {
        let db = setup_db().await;
        let (rep, _) = seed_user(&db, "rep", Sector::Representative, false).await;
        let prospect = seed_prospect(&db, "Lead Co", rep.id).await;
        let case = seed_case(&db, &rep, prospect.id).await;

        let scope = full_scope();
        start(&db, &scope, &rep, case.id).await.unwrap();
        let err = start(&db, &scope, &rep, case.id).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn finalize_is_terminal() {
        let db = setup_db().await;
        let (rep, _) = seed_user(&db, "rep", Sector::Representative, false).await;
        let prospect = seed_prospect(&db, "Lead Co", rep.id).await;
        let case = seed_case(&db, &rep, prospect.id).await;

        let scope = full_scope();
        let case = finalize(&db, &scope, &rep, case.id, FunnelOutcome::Closed)
            .await
            .unwrap();
        assert_eq!(case.status, FunnelStatus::Closed);
        assert_eq!(case.finalized_by, Some(rep.id));

        let err = finalize(&db, &scope, &rep, case.id, FunnelOutcome::Lost)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        let err = record_action(&db, &scope, &rep, case.id, "too late".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn edit_recomputes_total_and_leaves_audit_action() {
        let db = setup_db().await;
        let (rep, _) = seed_user(&db, "rep", Sector::Representative, false).await;
        let prospect = seed_prospect(&db, "Lead Co", rep.id).await;
        let case = seed_case(&db, &rep, prospect.id).await;

        let scope = full_scope();
        let updated = edit(
            &db,
            &scope,
            &rep,
            case.id,
            CaseChanges {
                trips: Some(6),
                avg_trip_value: Some("1200.00".parse().unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.trips, 6);
        assert_eq!(updated.total_value, Decimal::from(7200));

        let actions = ProspectingAction::find()
            .filter(prospecting_action::Column::ProspectingId.eq(case.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(actions.len(), 1);
        assert!(actions[0].description.starts_with("Updated: "));
        assert!(actions[0].description.contains("trips: 4 -> 6"));
        assert!(actions[0].description.contains("total_value: 4000.00 -> 7200.00"));
    }

    #[tokio::test]
    async fn edit_without_changes_is_a_no_op() {
        let db = setup_db().await;
        let (rep, _) = seed_user(&db, "rep", Sector::Representative, false).await;
        let prospect = seed_prospect(&db, "Lead Co", rep.id).await;
        let case = seed_case(&db, &rep, prospect.id).await;

        let scope = full_scope();
        let updated = edit(&db, &scope, &rep, case.id, CaseChanges::default())
            .await
            .unwrap();
        assert_eq!(updated, case);
        let actions = ProspectingAction::find().all(&db).await.unwrap();
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn representative_cannot_touch_foreign_case() {
        let db = setup_db().await;
        let (rep_a, _) = seed_user(&db, "rep_a", Sector::Representative, false).await;
        let (rep_b, _) = seed_user(&db, "rep_b", Sector::Representative, false).await;
        let prospect = seed_prospect(&db, "Lead Co", rep_a.id).await;
        let case = seed_case(&db, &rep_a, prospect.id).await;

        let scope = VisibilityScope::Representative(rep_b.id);
        let err = start(&db, &scope, &rep_b, case.id).await.unwrap_err();
        assert!(matches!(err, CoreError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn snapshot_counts_and_conversion() {
        let db = setup_db().await;
        let (rep, _) = seed_user(&db, "rep", Sector::Representative, false).await;
        let prospect = seed_prospect(&db, "Lead Co", rep.id).await;
        let scope = full_scope();

        let _stays_new = seed_case(&db, &rep, prospect.id).await;
        let negotiating = seed_case(&db, &rep, prospect.id).await;
        let closed = seed_case(&db, &rep, prospect.id).await;
        start(&db, &scope, &rep, negotiating.id).await.unwrap();
        finalize(&db, &scope, &rep, closed.id, FunnelOutcome::Closed)
            .await
            .unwrap();

        let snapshot = funnel_snapshot(&db, &scope).await.unwrap();
        assert_eq!(snapshot.new_count, 1);
        assert_eq!(snapshot.negotiating_count, 1);
        assert_eq!(snapshot.closed_count, 1);
        assert_eq!(snapshot.open_value, Decimal::from(8000));
        assert_eq!(snapshot.closed_value, Decimal::from(4000));
        assert_eq!(snapshot.closed_by_representative.len(), 1);
        assert_eq!(snapshot.closed_by_representative[0].user_id, rep.id);

        let stats = conversion_stats(&db, &scope).await.unwrap();
        assert_eq!(stats.finalized_count, 1);
        assert_eq!(stats.closed_count, 1);
        assert_eq!(stats.conversion_rate, Some(1.0));
    }

    #[tokio::test]
    async fn days_in_stage_uses_current_stage_anchor() {
        let now = Utc::now();
        let case = prospecting::Model {
            id: 1,
            prospect_id: 1,
            control_number: None,
            status: FunnelStatus::Negotiating,
            kind_id: None,
            duration_months: 6,
            trips: 1,
            avg_trip_value: Decimal::ZERO,
            total_value: Decimal::ZERO,
            created_by: 1,
            created_at: now - chrono::Duration::days(30),
            started_by: Some(1),
            negotiation_started_at: Some(now - chrono::Duration::days(10)),
            finalized_by: None,
            finalized_at: None,
        };
        assert_eq!(days_in_stage(&case, now), Some(10));
    }

    #[tokio::test]
    async fn days_in_stage_is_undefined_for_finalized_cases() {
        let now = Utc::now();
        let case = prospecting::Model {
            id: 1,
            prospect_id: 1,
            control_number: None,
            status: FunnelStatus::Closed,
            kind_id: None,
            duration_months: 6,
            trips: 1,
            avg_trip_value: Decimal::ZERO,
            total_value: Decimal::ZERO,
            created_by: 1,
            created_at: now - chrono::Duration::days(30),
            started_by: Some(1),
            negotiation_started_at: Some(now - chrono::Duration::days(10)),
            finalized_by: Some(1),
            finalized_at: Some(now - chrono::Duration::days(2)),
        };
        assert_eq!(days_in_stage(&case, now), None);
    }
}
