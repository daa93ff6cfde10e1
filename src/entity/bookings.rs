use sea_orm::entity::prelude::*;

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_ACCEPTED: &str = "ACCEPTED";
pub const STATUS_DENIED: &str = "DENIED";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cafe_id: i32,
    /// Unset on rows created before bookings were tied to accounts.
    pub customer_username: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub booking_date: String,
    pub booking_time: String,
    pub guests: i32,
    pub note: Option<String>,
    pub amenity_preference: Option<String>,
    pub allocated_table: Option<String>,
    pub status: String,
    pub denial_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cafes::Entity",
        from = "Column::CafeId",
        to = "super::cafes::Column::Id"
    )]
    Cafes,
}

impl Related<super::cafes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cafes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
