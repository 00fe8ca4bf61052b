use sea_orm::entity::prelude::*;

/// Append-only audit entry on a prospecting case, ordered by registration
/// time. Doubles as the audit trail for field edits: the funnel engine
/// records a synthetic action summarizing every tracked-field diff.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "prospecting_actions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub prospecting_id: i32,
    pub description: String,
    /// Path into the attachment store, keyed by upload date.
    pub attachment: Option<String>,
    pub recorded_by: i32,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::prospecting::Entity",
        from = "Column::ProspectingId",
        to = "super::prospecting::Column::Id"
    )]
    Prospecting,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecordedBy",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::prospecting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prospecting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
