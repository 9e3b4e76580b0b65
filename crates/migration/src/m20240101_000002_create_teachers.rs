//! Create `teachers` table.
//!
//! Same shape as `students`, with `subject` in place of `gpa`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(string_len(Teachers::Id, 64).primary_key())
                    .col(string_len(Teachers::Name, 128))
                    .col(big_integer(Teachers::Age))
                    .col(string_len(Teachers::Email, 255).unique_key())
                    .col(string_len(Teachers::Subject, 128))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Teachers::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Teachers { Table, Id, Name, Age, Email, Subject }
