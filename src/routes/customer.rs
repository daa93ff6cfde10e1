use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::{
    dto::{
        bookings::{BookingList, CreateBookingRequest},
        orders::{CreateOrderRequest, OrderList, OrderWithItems},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Booking,
    response::ApiResponse,
    services::{booking_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_my_bookings))
        .route("/bookings/{id}", delete(delete_my_booking))
        .route("/orders", get(list_my_orders))
        .route("/cafes/{cafe_id}/bookings", post(create_booking))
        .route("/cafes/{cafe_id}/orders", post(create_order))
}

#[utoipa::path(
    get,
    path = "/api/customer/bookings",
    responses(
        (status = 200, description = "Own bookings, newest first", body = ApiResponse<BookingList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn list_my_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::list_my_bookings(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/customer/bookings/{id}",
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking deleted", body = ApiResponse<Booking>),
        (status = 403, description = "Not your booking"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn delete_my_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::delete_my_booking(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customer/orders",
    responses((status = 200, description = "Own orders, newest first", body = ApiResponse<OrderList>)),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_my_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/customer/cafes/{cafe_id}/bookings",
    params(("cafe_id" = i32, Path, description = "Cafe ID")),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = ApiResponse<Booking>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Cafe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(cafe_id): Path<i32>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Booking>>)> {
    let resp = booking_service::create_booking(&state, &user, cafe_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/customer/cafes/{cafe_id}/orders",
    params(("cafe_id" = i32, Path, description = "Cafe ID")),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Cafe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(cafe_id): Path<i32>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let resp = order_service::create_order(&state, &user, cafe_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
