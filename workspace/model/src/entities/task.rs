use sea_orm::entity::prelude::*;

/// Task lifecycle: linear, no backward transitions, no cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum TaskStatus {
    #[sea_orm(string_value = "NOT_STARTED")]
    NotStarted,
    #[sea_orm(string_value = "STARTED")]
    Started,
    #[sea_orm(string_value = "FINISHED")]
    Finished,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "NOT_STARTED",
            TaskStatus::Started => "STARTED",
            TaskStatus::Finished => "FINISHED",
        }
    }
}

/// A unit of internal work on the kanban board. Tracks who created,
/// started and finished it, each with a timestamp.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_by: i32,
    pub created_at: DateTimeUtc,
    pub started_by: Option<i32>,
    pub started_at: Option<DateTimeUtc>,
    pub finished_by: Option<i32>,
    pub finished_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::task_action::Entity")]
    TaskAction,
}

impl Related<super::task_action::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskAction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
