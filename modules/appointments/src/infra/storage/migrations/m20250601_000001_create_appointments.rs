use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Appointments {
    Table,
    Id,
    Date,
    StartTime,
    DurationMinutes,
    Services,
    TotalPrice,
    TicketNumber,
    CustomerName,
    CustomerPhone,
    CustomerEmail,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TicketSequence {
    Table,
    Id,
    Value,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Appointments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Appointments::Date).string_len(10).not_null())
                    .col(ColumnDef::new(Appointments::StartTime).string_len(5).not_null())
                    .col(ColumnDef::new(Appointments::DurationMinutes).integer().not_null())
                    .col(ColumnDef::new(Appointments::Services).json().not_null())
                    .col(ColumnDef::new(Appointments::TotalPrice).string().not_null())
                    .col(
                        ColumnDef::new(Appointments::TicketNumber)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Appointments::CustomerName).string().not_null())
                    .col(ColumnDef::new(Appointments::CustomerPhone).string().not_null())
                    .col(ColumnDef::new(Appointments::CustomerEmail).string().not_null())
                    .col(
                        ColumnDef::new(Appointments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_date")
                    .table(Appointments::Table)
                    .col(Appointments::Date)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TicketSequence::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketSequence::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketSequence::Value).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        let seed = Query::insert()
            .into_table(TicketSequence::Table)
            .columns([TicketSequence::Id, TicketSequence::Value])
            .values_panic([1.into(), 0i64.into()])
            .to_owned();
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TicketSequence::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Appointments::Table).to_owned())
            .await
    }
}
