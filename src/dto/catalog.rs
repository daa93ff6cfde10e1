use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{FunctionCapacity, MenuItem};

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct CreateMenuItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Minor currency units.
    pub price: Option<i64>,
    pub available: Option<bool>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub available: Option<bool>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemList {
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpsertCapacityRequest {
    /// BIRTHDAY, ANNIVERSARY, CORPORATE or GET_TOGETHER.
    pub function_type: String,
    pub tables_available: Option<i32>,
    pub seats_available: Option<i32>,
    pub price: Option<i64>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CapacityList {
    pub items: Vec<FunctionCapacity>,
}
