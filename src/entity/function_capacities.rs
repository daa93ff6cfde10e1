use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::FunctionType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "function_capacities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cafe_id: i32,
    pub function_type: FunctionType,
    pub tables_available: i32,
    pub seats_available: Option<i32>,
    pub price: Option<i64>,
    pub enabled: bool,
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
