use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::ApprovalStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cafes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub owner_id: i32,
    pub cafe_name: String,
    pub owner_names: Option<String>,
    pub poc_designation: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub whatsapp_number: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub fssai_number: Option<String>,
    pub pan_number: Option<String>,
    pub gstin: Option<String>,
    pub shop_license_number: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc: Option<String>,
    pub bank_account_holder_name: Option<String>,
    pub active: bool,
    pub approval_status: ApprovalStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Visible to the public and open for bookings and orders.
    pub fn is_open(&self) -> bool {
        self.active && self.approval_status == ApprovalStatus::Approved
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::cafe_staff::Entity")]
    CafeStaff,
    #[sea_orm(has_many = "super::cafe_documents::Entity")]
    CafeDocuments,
    #[sea_orm(has_many = "super::cafe_images::Entity")]
    CafeImages,
    #[sea_orm(has_many = "super::menu_items::Entity")]
    MenuItems,
    #[sea_orm(has_many = "super::function_capacities::Entity")]
    FunctionCapacities,
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::cafe_staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CafeStaff.def()
    }
}

impl Related<super::cafe_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CafeDocuments.def()
    }
}

impl Related<super::cafe_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CafeImages.def()
    }
}

impl Related<super::menu_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItems.def()
    }
}

impl Related<super::function_capacities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FunctionCapacities.def()
    }
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
