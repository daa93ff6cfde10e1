use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::{ApprovalStatus, Role};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub approval_status: Option<ApprovalStatus>,
    pub force_password_change: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[sea_orm(unique)]
    pub email: Option<String>,
    #[sea_orm(unique)]
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::documents::Entity")]
    Documents,
    #[sea_orm(has_many = "super::academic_records::Entity")]
    AcademicRecords,
    #[sea_orm(has_many = "super::work_records::Entity")]
    WorkRecords,
    #[sea_orm(has_one = "super::cafes::Entity")]
    Cafes,
    #[sea_orm(has_one = "super::cafe_staff::Entity")]
    CafeStaff,
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::academic_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AcademicRecords.def()
    }
}

impl Related<super::work_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkRecords.def()
    }
}

impl Related<super::cafes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cafes.def()
    }
}

impl Related<super::cafe_staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CafeStaff.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
