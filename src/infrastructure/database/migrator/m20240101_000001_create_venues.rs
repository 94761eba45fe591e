//! Create venues table
//!
//! Read-only catalog data for the booking core; seeded from configuration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Venues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Venues::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Venues::Name).string().not_null())
                    .col(
                        ColumnDef::new(Venues::SportType)
                            .string()
                            .not_null()
                            .default("FUTSAL"),
                    )
                    .col(ColumnDef::new(Venues::Location).string().not_null().default(""))
                    .col(ColumnDef::new(Venues::PricePerHour).big_integer().not_null())
                    .col(ColumnDef::new(Venues::Facilities).string().not_null().default(""))
                    .col(ColumnDef::new(Venues::ImageUrl).string())
                    .col(
                        ColumnDef::new(Venues::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Venues::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Venues {
    Table,
    Id,
    Name,
    SportType,
    Location,
    PricePerHour,
    Facilities,
    ImageUrl,
    CreatedAt,
}
