use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub menu_item_id: i32,
    pub qty: i32,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub amenity_preference: Option<String>,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, ToSchema, Serialize)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}

#[derive(Debug, ToSchema, Serialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}
