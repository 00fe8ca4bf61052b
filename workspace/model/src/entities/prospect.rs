use sea_orm::entity::prelude::*;

/// A company being prospected. Distinct from [`super::client`]: promotion
/// creates a new client record and deletes the prospect in one transaction.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "prospects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tax_id: Option<String>,
    pub legal_name: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub registered_by: i32,
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
    #[sea_orm(has_many = "super::prospecting::Entity")]
    Prospecting,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::prospecting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prospecting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
