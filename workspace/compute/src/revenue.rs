//! Revenue aggregation engine.
//!
//! Loads scoped clients, their services and goals, then computes exact
//! Decimal sums keyed per client, representative, month or service kind.
//! Percentages are derived from Decimal arithmetic and only converted to
//! f64 at the transport boundary.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use common::{
    ClientPerformance, KindRevenue, MonthlyBreakdownEntry, PeriodSummary, ReportPeriod,
    RepresentativePerformance,
};
use model::entities::prelude::*;
use model::entities::{client, goal, profile, profile::ProfileStatus, service, user};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{debug, instrument};

use crate::error::{CoreError, Result};
use crate::scope::VisibilityScope;

/// revenue / goal as a percentage. `None` when the goal is zero; a zero
/// goal carries no attainment semantics.
fn attainment_pct(revenue: Decimal, goal: Decimal) -> Option<f64> {
    if goal.is_zero() {
        return None;
    }
    ((revenue / goal) * Decimal::from(100)).to_f64()
}

async fn scoped_clients(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
) -> Result<Vec<client::Model>> {
    let mut query = Client::find();
    if let Some(rep) = scope.owner_filter() {
        query = query.filter(client::Column::RegisteredBy.eq(rep));
    }
    Ok(query.all(db).await?)
}

async fn services_in_range(
    db: &DatabaseConnection,
    client_ids: &[i32],
    first: NaiveDate,
    last: NaiveDate,
) -> Result<Vec<service::Model>> {
    if client_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Service::find()
        .filter(service::Column::ClientId.is_in(client_ids.to_vec()))
        .filter(service::Column::ServiceDate.between(first, last))
        .all(db)
        .await?)
}

async fn goals_in_period(
    db: &DatabaseConnection,
    client_ids: &[i32],
    period: &ReportPeriod,
) -> Result<Vec<goal::Model>> {
    if client_ids.is_empty() {
        return Ok(Vec::new());
    }
    let months = period.months();
    // All supported periods stay within a single calendar year.
    let year = months[0].0;
    let month_list: Vec<i32> = months.iter().map(|&(_, m)| m as i32).collect();
    Ok(Goal::find()
        .filter(goal::Column::ClientId.is_in(client_ids.to_vec()))
        .filter(goal::Column::Year.eq(year))
        .filter(goal::Column::Month.is_in(month_list))
        .all(db)
        .await?)
}

fn period_range(period: &ReportPeriod) -> Result<(NaiveDate, NaiveDate)> {
    period
        .date_range()
        .ok_or_else(|| CoreError::Validation(format!("invalid period: {period}")))
}

/// Scope-wide totals for the dashboard header.
#[instrument(skip(db, scope))]
pub async fn period_summary(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    period: ReportPeriod,
    today: NaiveDate,
) -> Result<PeriodSummary> {
    let (first, last) = period_range(&period)?;
    let clients = scoped_clients(db, scope).await?;
    let ids: Vec<i32> = clients.iter().map(|c| c.id).collect();
    let services = services_in_range(db, &ids, first, last).await?;
    let goals = goals_in_period(db, &ids, &period).await?;

    let revenue: Decimal = services.iter().map(|s| s.value).sum();
    let service_count: i64 = services.iter().map(|s| s.quantity as i64).sum();
    let goal_total: Decimal = goals.iter().map(|g| g.value).sum();
    let goal = (!goal_total.is_zero()).then_some(goal_total);

    debug!(
        clients = ids.len(),
        services = services.len(),
        %revenue,
        "computed period summary"
    );

    Ok(PeriodSummary {
        period,
        revenue,
        service_count,
        goal,
        attainment_pct: goal.and_then(|g| attainment_pct(revenue, g)),
        remaining: goal.map(|g| (g - revenue).max(Decimal::ZERO)),
        days_remaining: period.days_remaining(today),
    })
}

/// Per-client revenue, goal and attainment, ordered by legal name.
/// Clients without a goal row report `None` attainment but still carry
/// their revenue.
#[instrument(skip(db, scope))]
pub async fn client_performance(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    period: ReportPeriod,
) -> Result<Vec<ClientPerformance>> {
    let (first, last) = period_range(&period)?;
    let mut clients = scoped_clients(db, scope).await?;
    clients.sort_by(|a, b| a.legal_name.cmp(&b.legal_name));
    let ids: Vec<i32> = clients.iter().map(|c| c.id).collect();
    let services = services_in_range(db, &ids, first, last).await?;
    let goals = goals_in_period(db, &ids, &period).await?;

    let mut revenue_by_client: HashMap<i32, (Decimal, i64)> = HashMap::new();
    for s in &services {
        let entry = revenue_by_client.entry(s.client_id).or_default();
        entry.0 += s.value;
        entry.1 += s.quantity as i64;
    }
    let mut goal_by_client: HashMap<i32, (Decimal, i32)> = HashMap::new();
    for g in &goals {
        let entry = goal_by_client.entry(g.client_id).or_default();
        entry.0 += g.value;
        entry.1 += g.business_days;
    }

    let rows = clients
        .into_iter()
        .map(|c| {
            let (revenue, trip_count) = revenue_by_client
                .get(&c.id)
                .copied()
                .unwrap_or((Decimal::ZERO, 0));
            let goal_row = goal_by_client.get(&c.id).copied();
            let goal = goal_row.map(|(value, _)| value);
            let business_days = goal_row.map(|(_, days)| days).unwrap_or(22);
            let remaining = goal.map(|g| (g - revenue).max(Decimal::ZERO));
            let daily_target = remaining.and_then(|r| {
                (business_days > 0).then(|| r / Decimal::from(business_days))
            });
            ClientPerformance {
                client_id: c.id,
                legal_name: c.legal_name,
                revenue,
                trip_count,
                goal,
                attainment_pct: goal.and_then(|g| attainment_pct(revenue, g)),
                remaining,
                business_days,
                daily_target,
            }
        })
        .collect();
    Ok(rows)
}

/// Per-representative ranking. A representative's goal is the sum of their
/// clients' goals; no representative-level goal record exists. Management
/// surface only.
#[instrument(skip(db, scope))]
pub async fn representative_performance(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    period: ReportPeriod,
) -> Result<Vec<RepresentativePerformance>> {
    if !scope.is_management() {
        return Err(CoreError::AccessDenied(
            "representative ranking requires management access".to_string(),
        ));
    }
    let (first, last) = period_range(&period)?;

    let reps: Vec<(user::Model, Option<profile::Model>)> = User::find()
        .find_also_related(Profile)
        .filter(user::Column::IsActive.eq(true))
        .all(db)
        .await?;
    let reps: Vec<user::Model> = reps
        .into_iter()
        .filter_map(|(u, p)| {
            let p = p?;
            (p.is_representative() && p.status == ProfileStatus::Active).then_some(u)
        })
        .filter(|u| match scope.owner_filter() {
            Some(rep) => u.id == rep,
            None => true,
        })
        .collect();

    let clients = Client::find()
        .filter(client::Column::RegisteredBy.is_not_null())
        .all(db)
        .await?;
    let mut clients_by_rep: HashMap<i32, Vec<i32>> = HashMap::new();
    for c in &clients {
        if let Some(owner) = c.registered_by {
            clients_by_rep.entry(owner).or_default().push(c.id);
        }
    }

    let all_ids: Vec<i32> = clients.iter().map(|c| c.id).collect();
    let services = services_in_range(db, &all_ids, first, last).await?;
    let goals = goals_in_period(db, &all_ids, &period).await?;

    let mut revenue_by_client: HashMap<i32, Decimal> = HashMap::new();
    for s in &services {
        *revenue_by_client.entry(s.client_id).or_default() += s.value;
    }
    let mut goal_by_client: HashMap<i32, Decimal> = HashMap::new();
    for g in &goals {
        *goal_by_client.entry(g.client_id).or_default() += g.value;
    }

    let mut rows: Vec<RepresentativePerformance> = reps
        .into_iter()
        .filter_map(|u| {
            let owned = clients_by_rep.get(&u.id)?;
            let revenue: Decimal = owned
                .iter()
                .filter_map(|id| revenue_by_client.get(id))
                .copied()
                .sum();
            let has_goal = owned.iter().any(|id| goal_by_client.contains_key(id));
            let goal_total: Decimal = owned
                .iter()
                .filter_map(|id| goal_by_client.get(id))
                .copied()
                .sum();
            let goal = has_goal.then_some(goal_total);
            Some(RepresentativePerformance {
                user_id: u.id,
                name: u.full_name(),
                client_count: owned.len() as i64,
                revenue,
                goal,
                attainment_pct: goal.and_then(|g| attainment_pct(revenue, g)),
            })
        })
        .collect();

    // Descending by attainment; representatives without a goal rank last.
    rows.sort_by(|a, b| match (a.attainment_pct, b.attainment_pct) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.user_id.cmp(&b.user_id),
    });
    Ok(rows)
}

/// Year-at-a-glance: revenue against goal for each month of `year`.
#[instrument(skip(db, scope))]
pub async fn monthly_breakdown(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    year: i32,
) -> Result<Vec<MonthlyBreakdownEntry>> {
    let period = ReportPeriod::Year { year };
    let (first, last) = period_range(&period)?;
    let clients = scoped_clients(db, scope).await?;
    let ids: Vec<i32> = clients.iter().map(|c| c.id).collect();
    let services = services_in_range(db, &ids, first, last).await?;
    let goals = goals_in_period(db, &ids, &period).await?;

    let mut revenue_by_month: HashMap<u32, Decimal> = HashMap::new();
    for s in &services {
        *revenue_by_month.entry(s.service_date.month()).or_default() += s.value;
    }
    let mut goal_by_month: HashMap<u32, (Decimal, bool)> = HashMap::new();
    for g in &goals {
        let entry = goal_by_month.entry(g.month as u32).or_default();
        entry.0 += g.value;
        entry.1 = true;
    }

    let rows = (1..=12)
        .map(|month| {
            let revenue = revenue_by_month.get(&month).copied().unwrap_or_default();
            let goal = goal_by_month
                .get(&month)
                .copied()
                .and_then(|(value, found)| found.then_some(value));
            let attainment = goal.and_then(|g| attainment_pct(revenue, g));
            MonthlyBreakdownEntry {
                year,
                month,
                revenue,
                goal,
                attainment_pct: attainment,
                attained: attainment.is_some_and(|pct| pct >= 100.0),
            }
        })
        .collect();
    Ok(rows)
}

/// Revenue grouped by service kind, largest first. Services without a kind
/// land in an "UNSPECIFIED" bucket.
#[instrument(skip(db, scope))]
pub async fn revenue_by_kind(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    period: ReportPeriod,
) -> Result<Vec<KindRevenue>> {
    let (first, last) = period_range(&period)?;
    let clients = scoped_clients(db, scope).await?;
    let ids: Vec<i32> = clients.iter().map(|c| c.id).collect();
    let services = services_in_range(db, &ids, first, last).await?;
    let kinds = ServiceKind::find().all(db).await?;
    let names: HashMap<i32, String> = kinds.into_iter().map(|k| (k.id, k.name)).collect();

    let mut by_kind: HashMap<Option<i32>, (i64, Decimal)> = HashMap::new();
    for s in &services {
        let entry = by_kind.entry(s.kind_id).or_default();
        entry.0 += s.quantity as i64;
        entry.1 += s.value;
    }

    let mut rows: Vec<KindRevenue> = by_kind
        .into_iter()
        .map(|(kind_id, (service_count, revenue))| KindRevenue {
            kind_id,
            kind_name: kind_id
                .and_then(|id| names.get(&id).cloned())
                .unwrap_or_else(|| "UNSPECIFIED".to_string()),
            service_count,
            revenue,
        })
        .collect();
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    Ok(rows)
}
