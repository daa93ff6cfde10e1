use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_identity_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cafes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cafes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // one cafe per owner
                    .col(ColumnDef::new(Cafes::OwnerId).integer().not_null().unique_key())
                    .col(ColumnDef::new(Cafes::CafeName).string().not_null())
                    .col(ColumnDef::new(Cafes::OwnerNames).string().null())
                    .col(ColumnDef::new(Cafes::PocDesignation).string().null())
                    .col(ColumnDef::new(Cafes::Description).text().null())
                    .col(ColumnDef::new(Cafes::Phone).string().null())
                    .col(ColumnDef::new(Cafes::Email).string().null())
                    .col(ColumnDef::new(Cafes::WhatsappNumber).string().null())
                    .col(ColumnDef::new(Cafes::AddressLine).string().null())
                    .col(ColumnDef::new(Cafes::City).string().null())
                    .col(ColumnDef::new(Cafes::State).string().null())
                    .col(ColumnDef::new(Cafes::Pincode).string().null())
                    .col(ColumnDef::new(Cafes::OpeningTime).string().null())
                    .col(ColumnDef::new(Cafes::ClosingTime).string().null())
                    .col(ColumnDef::new(Cafes::FssaiNumber).string().null())
                    .col(ColumnDef::new(Cafes::PanNumber).string().null())
                    .col(ColumnDef::new(Cafes::Gstin).string().null())
                    .col(ColumnDef::new(Cafes::ShopLicenseNumber).string().null())
                    .col(ColumnDef::new(Cafes::BankAccountNumber).string().null())
                    .col(ColumnDef::new(Cafes::BankIfsc).string().null())
                    .col(ColumnDef::new(Cafes::BankAccountHolderName).string().null())
                    .col(ColumnDef::new(Cafes::Active).boolean().not_null().default(true))
                    .col(ColumnDef::new(Cafes::ApprovalStatus).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Cafes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cafes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cafes_owner")
                            .from(Cafes::Table, Cafes::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CafeStaff::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CafeStaff::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CafeStaff::CafeId).integer().not_null())
                    .col(
                        ColumnDef::new(CafeStaff::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cafe_staff_cafe")
                            .from(CafeStaff::Table, CafeStaff::CafeId)
                            .to(Cafes::Table, Cafes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cafe_staff_user")
                            .from(CafeStaff::Table, CafeStaff::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cafe_staff_cafe")
                    .table(CafeStaff::Table)
                    .col(CafeStaff::CafeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CafeDocuments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CafeDocuments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CafeDocuments::CafeId).integer().not_null())
                    .col(ColumnDef::new(CafeDocuments::DocKey).string().not_null())
                    .col(ColumnDef::new(CafeDocuments::DocumentName).string().null())
                    .col(ColumnDef::new(CafeDocuments::DocumentType).string().null())
                    .col(ColumnDef::new(CafeDocuments::Size).big_integer().not_null())
                    .col(ColumnDef::new(CafeDocuments::StorageKey).string().not_null())
                    .col(
                        ColumnDef::new(CafeDocuments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cafe_documents_cafe")
                            .from(CafeDocuments::Table, CafeDocuments::CafeId)
                            .to(Cafes::Table, Cafes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_cafe_documents_cafe_key")
                    .table(CafeDocuments::Table)
                    .col(CafeDocuments::CafeId)
                    .col(CafeDocuments::DocKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CafeImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CafeImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CafeImages::CafeId).integer().not_null())
                    .col(ColumnDef::new(CafeImages::Filename).string().not_null())
                    .col(ColumnDef::new(CafeImages::ContentType).string().not_null())
                    .col(ColumnDef::new(CafeImages::StorageKey).string().not_null())
                    .col(ColumnDef::new(CafeImages::Size).big_integer().not_null())
                    .col(ColumnDef::new(CafeImages::Cover).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(CafeImages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cafe_images_cafe")
                            .from(CafeImages::Table, CafeImages::CafeId)
                            .to(Cafes::Table, Cafes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MenuItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MenuItems::CafeId).integer().not_null())
                    .col(ColumnDef::new(MenuItems::Name).string().not_null())
                    .col(ColumnDef::new(MenuItems::Description).text().null())
                    .col(ColumnDef::new(MenuItems::Price).big_integer().not_null())
                    .col(ColumnDef::new(MenuItems::Available).boolean().not_null().default(true))
                    .col(ColumnDef::new(MenuItems::Category).string().null())
                    .col(ColumnDef::new(MenuItems::ImageFilename).string().null())
                    .col(ColumnDef::new(MenuItems::ImageContentType).string().null())
                    .col(ColumnDef::new(MenuItems::ImageKey).string().null())
                    .col(ColumnDef::new(MenuItems::ImageSize).big_integer().null())
                    .col(
                        ColumnDef::new(MenuItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menu_items_cafe")
                            .from(MenuItems::Table, MenuItems::CafeId)
                            .to(Cafes::Table, Cafes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FunctionCapacities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FunctionCapacities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FunctionCapacities::CafeId).integer().not_null())
                    .col(ColumnDef::new(FunctionCapacities::FunctionType).string_len(32).not_null())
                    .col(ColumnDef::new(FunctionCapacities::TablesAvailable).integer().not_null())
                    .col(ColumnDef::new(FunctionCapacities::SeatsAvailable).integer().null())
                    .col(ColumnDef::new(FunctionCapacities::Price).big_integer().null())
                    .col(
                        ColumnDef::new(FunctionCapacities::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_function_capacities_cafe")
                            .from(FunctionCapacities::Table, FunctionCapacities::CafeId)
                            .to(Cafes::Table, Cafes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_function_capacities_cafe_type")
                    .table(FunctionCapacities::Table)
                    .col(FunctionCapacities::CafeId)
                    .col(FunctionCapacities::FunctionType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FunctionCapacities::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MenuItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CafeImages::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CafeDocuments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CafeStaff::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cafes::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(super) enum Cafes {
    Table,
    Id,
    OwnerId,
    CafeName,
    OwnerNames,
    PocDesignation,
    Description,
    Phone,
    Email,
    WhatsappNumber,
    AddressLine,
    City,
    State,
    Pincode,
    OpeningTime,
    ClosingTime,
    FssaiNumber,
    PanNumber,
    Gstin,
    ShopLicenseNumber,
    BankAccountNumber,
    BankIfsc,
    BankAccountHolderName,
    Active,
    ApprovalStatus,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CafeStaff {
    Table,
    UserId,
    CafeId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CafeDocuments {
    Table,
    Id,
    CafeId,
    DocKey,
    DocumentName,
    DocumentType,
    Size,
    StorageKey,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CafeImages {
    Table,
    Id,
    CafeId,
    Filename,
    ContentType,
    StorageKey,
    Size,
    Cover,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MenuItems {
    Table,
    Id,
    CafeId,
    Name,
    Description,
    Price,
    Available,
    Category,
    ImageFilename,
    ImageContentType,
    ImageKey,
    ImageSize,
    CreatedAt,
}

#[derive(DeriveIden)]
enum FunctionCapacities {
    Table,
    Id,
    CafeId,
    FunctionType,
    TablesAvailable,
    SeatsAvailable,
    Price,
    Enabled,
}
