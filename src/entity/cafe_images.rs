use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cafe_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cafe_id: i32,
    pub filename: String,
    pub content_type: String,
    pub storage_key: String,
    pub size: i64,
    pub cover: bool,
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
