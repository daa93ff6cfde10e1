use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_cafe_tables::Cafes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::CafeId).integer().not_null())
                    .col(ColumnDef::new(Bookings::CustomerUsername).string().null())
                    .col(ColumnDef::new(Bookings::CustomerName).string().not_null())
                    .col(ColumnDef::new(Bookings::CustomerPhone).string().not_null())
                    .col(ColumnDef::new(Bookings::BookingDate).string().not_null())
                    .col(ColumnDef::new(Bookings::BookingTime).string().not_null())
                    .col(ColumnDef::new(Bookings::Guests).integer().not_null())
                    .col(ColumnDef::new(Bookings::Note).text().null())
                    .col(ColumnDef::new(Bookings::AmenityPreference).string().null())
                    .col(ColumnDef::new(Bookings::AllocatedTable).string().null())
                    .col(ColumnDef::new(Bookings::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Bookings::DenialReason).text().null())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_cafe")
                            .from(Bookings::Table, Bookings::CafeId)
                            .to(Cafes::Table, Cafes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_customer_username")
                    .table(Bookings::Table)
                    .col(Bookings::CustomerUsername)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_customer_phone")
                    .table(Bookings::Table)
                    .col(Bookings::CustomerPhone)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::CafeId).integer().not_null())
                    .col(ColumnDef::new(Orders::CustomerUsername).string().null())
                    .col(ColumnDef::new(Orders::CustomerName).string().not_null())
                    .col(ColumnDef::new(Orders::CustomerPhone).string().not_null())
                    .col(ColumnDef::new(Orders::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Orders::TotalAmount).big_integer().not_null())
                    .col(ColumnDef::new(Orders::AmenityPreference).string().null())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_cafe")
                            .from(Orders::Table, Orders::CafeId)
                            .to(Cafes::Table, Cafes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                    // no FK: the menu item may disappear, the line must not
                    .col(ColumnDef::new(OrderItems::MenuItemId).integer().not_null())
                    .col(ColumnDef::new(OrderItems::ItemName).string().not_null())
                    .col(ColumnDef::new(OrderItems::Price).big_integer().not_null())
                    .col(ColumnDef::new(OrderItems::Qty).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    CafeId,
    CustomerUsername,
    CustomerName,
    CustomerPhone,
    BookingDate,
    BookingTime,
    Guests,
    Note,
    AmenityPreference,
    AllocatedTable,
    Status,
    DenialReason,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    CafeId,
    CustomerUsername,
    CustomerName,
    CustomerPhone,
    Status,
    TotalAmount,
    AmenityPreference,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    MenuItemId,
    ItemName,
    Price,
    Qty,
}
