use super::m20240101_000001_create_users_table::Users;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum People {
    Table,
    Id,
    UserId,
    Name,
    Dob,
    Relationship,
    Education,
    Address,
    Gender,
    Work,
    WorkHistory,
    Notes,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(People::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(People::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(People::UserId).integer().not_null())
                    .col(ColumnDef::new(People::Name).string_len(150).not_null())
                    .col(ColumnDef::new(People::Dob).string_len(50).not_null())
                    .col(
                        ColumnDef::new(People::Relationship)
                            .string_len(150)
                            .not_null(),
                    )
                    .col(ColumnDef::new(People::Education).string_len(150).null())
                    .col(ColumnDef::new(People::Address).string_len(250).null())
                    .col(ColumnDef::new(People::Gender).string_len(10).null())
                    .col(ColumnDef::new(People::Work).string_len(150).null())
                    .col(ColumnDef::new(People::WorkHistory).string_len(250).null())
                    .col(ColumnDef::new(People::Notes).text().null())
                    .col(
                        ColumnDef::new(People::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_people_user_id")
                            .from(People::Table, People::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_people_user_id")
                    .table(People::Table)
                    .col(People::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(People::Table).to_owned())
            .await
    }
}
