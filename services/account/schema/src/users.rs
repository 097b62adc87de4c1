use sea_orm::entity::prelude::*;

/// Minimal user record behind the identity-provider boundary.
/// Stores only the fields the login flow needs (email lookup, password
/// verification); registration and lockout live elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::otps::Entity")]
    Otps,
}

impl Related<super::otps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Otps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
