use sea_orm::entity::prelude::*;

/// An active client: a company the agency already renders services to.
/// Owned by the representative who registered it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// 14-digit company tax identifier.
    pub tax_id: String,
    pub legal_name: String,
    pub address: String,
    pub contact_name: String,
    pub contact_phone: String,
    /// Owning representative. Nullable so deleting a user keeps the client.
    pub registered_by: Option<i32>,
    pub registered_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RegisteredBy",
        to = "super::user::Column::Id"
    )]
    User,
    /// Services protect the client from deletion (RESTRICT, not cascade).
    #[sea_orm(has_many = "super::service::Entity")]
    Service,
    #[sea_orm(has_many = "super::goal::Entity")]
    Goal,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::goal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
