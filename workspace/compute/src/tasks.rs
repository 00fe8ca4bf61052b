//! Internal task tracker. Linear lifecycle with actor and timestamp
//! stamps at each transition. The board shows the two open columns in
//! full and pages through finished tasks, newest finalized first.

use chrono::Utc;
use model::entities::prelude::*;
use model::entities::task::TaskStatus;
use model::entities::{task, task_action};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, instrument};

use crate::error::{CoreError, Result};
use crate::scope::VisibilityScope;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Kanban view: full open columns plus one page of finished tasks.
#[derive(Debug, Clone)]
pub struct TaskBoard {
    pub not_started: Vec<task::Model>,
    pub started: Vec<task::Model>,
    pub finished: Vec<task::Model>,
    pub finished_total: u64,
    pub finished_pages: u64,
    pub page: u64,
}

/// A user is involved in a task when they created, started or finished it.
fn involvement_condition(user_id: i32) -> Condition {
    Condition::any()
        .add(task::Column::CreatedBy.eq(user_id))
        .add(task::Column::StartedBy.eq(user_id))
        .add(task::Column::FinishedBy.eq(user_id))
}

fn is_involved(task: &task::Model, user_id: i32) -> bool {
    task.created_by == user_id
        || task.started_by == Some(user_id)
        || task.finished_by == Some(user_id)
}

async fn load_visible(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    id: i32,
) -> Result<task::Model> {
    let task = Task::find_by_id(id)
        .one(db)
        .await?
        .ok_or(CoreError::NotFound { entity: "task", id })?;
    if let VisibilityScope::Representative(user_id) = *scope {
        if !is_involved(&task, user_id) {
            return Err(CoreError::AccessDenied(format!(
                "task {id} does not involve this user"
            )));
        }
    }
    Ok(task)
}

#[instrument(skip(db, actor, description), fields(actor_id = actor.id))]
pub async fn create(
    db: &DatabaseConnection,
    actor: &model::entities::user::Model,
    title: String,
    description: String,
) -> Result<task::Model> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("task title cannot be empty".to_string()));
    }
    Ok(task::ActiveModel {
        title: Set(title),
        description: Set(description),
        status: Set(TaskStatus::NotStarted),
        created_by: Set(actor.id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// NOT_STARTED -> STARTED.
#[instrument(skip(db, scope, actor), fields(actor_id = actor.id))]
pub async fn start(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    actor: &model::entities::user::Model,
    id: i32,
) -> Result<task::Model> {
    let task = load_visible(db, scope, id).await?;
    if task.status != TaskStatus::NotStarted {
        return Err(CoreError::InvalidTransition {
            from: task.status.as_str().to_string(),
            to: TaskStatus::Started.as_str().to_string(),
        });
    }
    let mut active = task.into_active_model();
    active.status = Set(TaskStatus::Started);
    active.started_by = Set(Some(actor.id));
    active.started_at = Set(Some(Utc::now()));
    Ok(active.update(db).await?)
}

/// STARTED -> FINISHED. A task cannot skip the started stage or reopen.
#[instrument(skip(db, scope, actor), fields(actor_id = actor.id))]
pub async fn finish(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    actor: &model::entities::user::Model,
    id: i32,
) -> Result<task::Model> {
    let task = load_visible(db, scope, id).await?;
    if task.status != TaskStatus::Started {
        return Err(CoreError::InvalidTransition {
            from: task.status.as_str().to_string(),
            to: TaskStatus::Finished.as_str().to_string(),
        });
    }
    let mut active = task.into_active_model();
    active.status = Set(TaskStatus::Finished);
    active.finished_by = Set(Some(actor.id));
    active.finished_at = Set(Some(Utc::now()));
    Ok(active.update(db).await?)
}

/// Records work done on a task. Recording against a NOT_STARTED task
/// starts it in the same transaction; finished tasks reject new actions.
#[instrument(skip(db, scope, actor, description, attachment), fields(actor_id = actor.id))]
pub async fn record_action(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    actor: &model::entities::user::Model,
    id: i32,
    description: String,
    attachment: Option<String>,
) -> Result<(task::Model, task_action::Model)> {
    let task = load_visible(db, scope, id).await?;
    if task.status == TaskStatus::Finished {
        return Err(CoreError::Validation(format!(
            "task {id} is finished and no longer accepts actions"
        )));
    }

    let now = Utc::now();
    let txn = db.begin().await?;
    let action = task_action::ActiveModel {
        task_id: Set(task.id),
        description: Set(description),
        attachment: Set(attachment),
        recorded_by: Set(actor.id),
        recorded_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let task = if task.status == TaskStatus::NotStarted {
        debug!(task_id = task.id, "first action, starting task");
        let mut active = task.into_active_model();
        active.status = Set(TaskStatus::Started);
        active.started_by = Set(Some(actor.id));
        active.started_at = Set(Some(now));
        active.update(&txn).await?
    } else {
        task
    };
    txn.commit().await?;
    Ok((task, action))
}

pub async fn get_task(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    id: i32,
) -> Result<task::Model> {
    load_visible(db, scope, id).await
}

/// Action history of a task, oldest first.
pub async fn list_actions(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    id: i32,
) -> Result<Vec<task_action::Model>> {
    let task = load_visible(db, scope, id).await?;
    Ok(TaskAction::find()
        .filter(task_action::Column::TaskId.eq(task.id))
        .order_by_asc(task_action::Column::RecordedAt)
        .all(db)
        .await?)
}

/// The board. Representatives are always narrowed to their own tasks;
/// management may pass `involved` to focus on one user. `page` is
/// 1-based and applies to the finished column only.
#[instrument(skip(db, scope))]
pub async fn board(
    db: &DatabaseConnection,
    scope: &VisibilityScope,
    involved: Option<i32>,
    page: u64,
    page_size: u64,
) -> Result<TaskBoard> {
    let focus = match *scope {
        VisibilityScope::Representative(user_id) => Some(user_id),
        VisibilityScope::Full { .. } => involved,
    };
    let base = || {
        let mut query = Task::find();
        if let Some(user_id) = focus {
            query = query.filter(involvement_condition(user_id));
        }
        query
    };

    let not_started = base()
        .filter(task::Column::Status.eq(TaskStatus::NotStarted))
        .order_by_asc(task::Column::CreatedAt)
        .all(db)
        .await?;
    let started = base()
        .filter(task::Column::Status.eq(TaskStatus::Started))
        .order_by_asc(task::Column::StartedAt)
        .all(db)
        .await?;

    let page = page.max(1);
    let page_size = page_size.max(1);
    let paginator = base()
        .filter(task::Column::Status.eq(TaskStatus::Finished))
        .order_by_desc(task::Column::FinishedAt)
        .order_by_desc(task::Column::Id)
        .paginate(db, page_size);
    let totals = paginator.num_items_and_pages().await?;
    let finished = paginator.fetch_page(page - 1).await?;

    Ok(TaskBoard {
        not_started,
        started,
        finished,
        finished_total: totals.number_of_items,
        finished_pages: totals.number_of_pages,
        page,
    })
}
