use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Otps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Otps::RequestId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Otps::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Otps::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Otps::Secret).string().not_null())
                    .col(
                        ColumnDef::new(Otps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Otps::Table, Otps::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Plain index, not a liveness-filtered unique one: the issuer's
        // "already sent" check is best-effort and two concurrent logins may
        // both insert. Both credentials validate independently.
        manager
            .create_index(
                Index::create()
                    .table(Otps::Table)
                    .col(Otps::UserId)
                    .name("idx_otps_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Otps::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Otps {
    Table,
    RequestId,
    UserId,
    ExpiresAt,
    Secret,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
