use sea_orm::entity::prelude::*;

/// The sector (role) a user belongs to. Determines visibility scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Sector {
    #[sea_orm(string_value = "REPRESENTATIVE")]
    Representative,
    #[sea_orm(string_value = "COMMERCIAL")]
    Commercial,
    #[sea_orm(string_value = "OPERATIONS_MANAGER")]
    OperationsManager,
    #[sea_orm(string_value = "DIRECTORSHIP")]
    Directorship,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

impl Sector {
    /// Commercial directorship, directorship and system admins have
    /// unrestricted (full-tenant) visibility.
    pub fn has_management_access(self) -> bool {
        matches!(self, Sector::Commercial | Sector::Directorship | Sector::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sector::Representative => "REPRESENTATIVE",
            Sector::Commercial => "COMMERCIAL",
            Sector::OperationsManager => "OPERATIONS_MANAGER",
            Sector::Directorship => "DIRECTORSHIP",
            Sector::Admin => "ADMIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum ProfileStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "INACTIVE")]
    Inactive,
}

/// Role information for a user. Invariant: exactly one profile per user,
/// created in the same transaction as the user itself.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub phone: Option<String>,
    pub sector: Sector,
    pub status: ProfileStatus,
}

impl Model {
    pub fn is_representative(&self) -> bool {
        self.sector == Sector::Representative
    }

    pub fn has_management_access(&self) -> bool {
        self.sector.has_management_access()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
