use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;

use crate::{
    audit,
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems},
    entity::{
        menu_items::{Column as MenuCol, Entity as MenuItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{self, ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    services::{
        booking_service::require_customer,
        identity::non_blank,
        tenant::{find_owned_cafe, require_open_cafe, require_owner},
    },
    state::AppState,
};

struct PricedLine {
    menu_item_id: i32,
    item_name: String,
    price: i64,
    qty: i32,
}

/// Places an order against an open cafe. Every line is priced from the current
/// menu and the name and price are copied onto the order item, so later menu
/// edits never change a placed order.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    cafe_id: i32,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let customer = require_customer(state, user).await?;
    let cafe = require_open_cafe(&state.orm, cafe_id).await?;

    let customer_name = non_blank(payload.customer_name.as_deref())
        .ok_or_else(|| AppError::validation("Customer name is required"))?;
    let customer_phone = non_blank(payload.customer_phone.as_deref())
        .ok_or_else(|| AppError::validation("Customer phone is required"))?;
    if payload.items.is_empty() {
        return Err(AppError::validation("Items are required"));
    }
    if payload.items.iter().any(|line| line.qty <= 0) {
        return Err(AppError::validation("Quantity must be positive"));
    }

    let ids: Vec<i32> = payload.items.iter().map(|line| line.menu_item_id).collect();
    let menu: HashMap<i32, _> = MenuItems::find()
        .filter(MenuCol::CafeId.eq(cafe.id))
        .filter(MenuCol::Id.is_in(ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let mut lines = Vec::with_capacity(payload.items.len());
    let mut total_amount: i64 = 0;
    for line in &payload.items {
        let item = match menu.get(&line.menu_item_id) {
            Some(m) => m,
            None => {
                return Err(AppError::validation(format!(
                    "Menu item {} does not belong to this cafe",
                    line.menu_item_id
                )));
            }
        };
        total_amount = item
            .price
            .checked_mul(i64::from(line.qty))
            .and_then(|subtotal| total_amount.checked_add(subtotal))
            .ok_or_else(|| AppError::validation("Order total too large"))?;
        lines.push(PricedLine {
            menu_item_id: item.id,
            item_name: item.name.clone(),
            price: item.price,
            qty: line.qty,
        });
    }

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: NotSet,
        cafe_id: Set(cafe.id),
        customer_username: Set(Some(customer.username.clone())),
        customer_name: Set(customer_name),
        customer_phone: Set(customer_phone),
        status: Set(orders::STATUS_PLACED.to_string()),
        total_amount: Set(total_amount),
        amenity_preference: Set(non_blank(payload.amenity_preference.as_deref())),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            menu_item_id: Set(line.menu_item_id),
            item_name: Set(line.item_name),
            price: Set(line.price),
            qty: Set(line.qty),
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    txn.commit().await?;

    tracing::info!(order_id = order.id, cafe_id = cafe.id, username = %customer.username, total_amount, "order placed");
    audit::record(
        state,
        Some(&customer.username),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "cafe_id": cafe.id, "total_amount": total_amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_my_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let customer = require_customer(state, user).await?;
    let orders = Orders::find()
        .filter(OrderCol::CustomerUsername.eq(customer.username))
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id)
        .all(&state.orm)
        .await?;
    let items = with_items(&state.orm, orders).await?;
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(Meta::empty())))
}

pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(c) => c,
        None => return Err(AppError::not_found("Cafe not found")),
    };
    let orders = Orders::find()
        .filter(OrderCol::CafeId.eq(cafe.id))
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id)
        .all(&state.orm)
        .await?;
    let items = with_items(&state.orm, orders).await?;
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(Meta::empty())))
}

async fn with_items<C: ConnectionTrait>(conn: &C, orders: Vec<OrderModel>) -> AppResult<Vec<OrderWithItems>> {
    let ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let mut by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
    if !ids.is_empty() {
        for item in OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(ids))
            .order_by_asc(OrderItemCol::Id)
            .all(conn)
            .await?
        {
            by_order
                .entry(item.order_id)
                .or_default()
                .push(order_item_from_entity(item));
        }
    }

    Ok(orders
        .into_iter()
        .map(|o| OrderWithItems {
            items: by_order.remove(&o.id).unwrap_or_default(),
            order: order_from_entity(o),
        })
        .collect())
}

pub fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        cafe_id: model.cafe_id,
        customer_username: model.customer_username,
        customer_name: model.customer_name,
        customer_phone: model.customer_phone,
        status: model.status,
        total_amount: model.total_amount,
        amenity_preference: model.amenity_preference,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        menu_item_id: model.menu_item_id,
        item_name: model.item_name,
        price: model.price,
        qty: model.qty,
    }
}
