use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Users::ApprovalStatus).string_len(16).null())
                    .col(
                        ColumnDef::new(Users::ForcePasswordChange)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::FirstName).string().null())
                    .col(ColumnDef::new(Users::LastName).string().null())
                    // Uniqueness of contact details is enforced here, not only by lookups.
                    .col(ColumnDef::new(Users::Email).string().null().unique_key())
                    .col(ColumnDef::new(Users::Phone).string().null().unique_key())
                    .col(ColumnDef::new(Users::Gender).string().null())
                    .col(ColumnDef::new(Users::MaritalStatus).string().null())
                    .col(ColumnDef::new(Users::Street).string().null())
                    .col(ColumnDef::new(Users::City).string().null())
                    .col(ColumnDef::new(Users::State).string().null())
                    .col(ColumnDef::new(Users::Pincode).string().null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Documents::UserId).integer().not_null())
                    .col(ColumnDef::new(Documents::DocumentName).string().null())
                    .col(ColumnDef::new(Documents::DocumentType).string().null())
                    .col(ColumnDef::new(Documents::Size).big_integer().not_null())
                    .col(ColumnDef::new(Documents::StorageKey).string().not_null())
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_user")
                            .from(Documents::Table, Documents::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AcademicRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AcademicRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AcademicRecords::UserId).integer().not_null())
                    .col(ColumnDef::new(AcademicRecords::Position).integer().not_null())
                    .col(ColumnDef::new(AcademicRecords::InstitutionName).string().null())
                    .col(ColumnDef::new(AcademicRecords::Degree).string().null())
                    .col(ColumnDef::new(AcademicRecords::PassingYear).integer().null())
                    .col(ColumnDef::new(AcademicRecords::Grade).string().null())
                    .col(ColumnDef::new(AcademicRecords::GradeInPercentage).double().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_academic_records_user")
                            .from(AcademicRecords::Table, AcademicRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WorkRecords::UserId).integer().not_null())
                    .col(ColumnDef::new(WorkRecords::Position).integer().not_null())
                    .col(ColumnDef::new(WorkRecords::StartDate).string().null())
                    .col(ColumnDef::new(WorkRecords::EndDate).string().null())
                    .col(
                        ColumnDef::new(WorkRecords::CurrentlyWorking)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(WorkRecords::CompanyName).string().null())
                    .col(ColumnDef::new(WorkRecords::Designation).string().null())
                    .col(ColumnDef::new(WorkRecords::Ctc).double().null())
                    .col(ColumnDef::new(WorkRecords::ReasonForLeaving).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_records_user")
                            .from(WorkRecords::Table, WorkRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditLogs::Actor).string().null())
                    .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                    .col(ColumnDef::new(AuditLogs::Resource).string().null())
                    .col(ColumnDef::new(AuditLogs::Metadata).json().null())
                    .col(
                        ColumnDef::new(AuditLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkRecords::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AcademicRecords::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Documents::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(super) enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    ApprovalStatus,
    ForcePasswordChange,
    FirstName,
    LastName,
    Email,
    Phone,
    Gender,
    MaritalStatus,
    Street,
    City,
    State,
    Pincode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Documents {
    Table,
    Id,
    UserId,
    DocumentName,
    DocumentType,
    Size,
    StorageKey,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AcademicRecords {
    Table,
    Id,
    UserId,
    Position,
    InstitutionName,
    Degree,
    PassingYear,
    Grade,
    GradeInPercentage,
}

#[derive(DeriveIden)]
enum WorkRecords {
    Table,
    Id,
    UserId,
    Position,
    StartDate,
    EndDate,
    CurrentlyWorking,
    CompanyName,
    Designation,
    Ctc,
    ReasonForLeaving,
}

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    Id,
    Actor,
    Action,
    Resource,
    Metadata,
    CreatedAt,
}
