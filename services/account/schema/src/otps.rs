use sea_orm::entity::prelude::*;

/// One-time login-confirmation credential delivered by email.
///
/// `expires_at` is stored truncated to whole seconds: the confirmation link
/// carries the same value as a Unix-seconds timestamp, and validation
/// requires an exact-equality match against this column. Rows are never
/// updated; expired rows are swept in bulk by the polling endpoint.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    /// Reserved hardening field (digest over user id, email and expiry);
    /// written at issuance, not consulted by any validation path.
    pub secret: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
