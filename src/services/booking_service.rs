use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, sea_query::Expr,
};

use crate::{
    audit,
    dto::bookings::{BookingDecision, BookingList, CreateBookingRequest, DecideBookingRequest},
    entity::{
        bookings::{
            self, ActiveModel as BookingActive, Column as BookingCol, Entity as Bookings,
            Model as BookingModel,
        },
        sea_orm_active_enums::Role,
        users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Booking,
    response::{ApiResponse, Meta},
    services::{
        identity::{non_blank, require_actor},
        tenant::{find_owned_cafe, require_open_cafe, require_owner},
    },
    state::AppState,
};

pub(crate) async fn require_customer(state: &AppState, user: &AuthUser) -> AppResult<users::Model> {
    require_actor(&state.orm, &user.username, &[Role::Customer]).await
}

pub async fn create_booking(
    state: &AppState,
    user: &AuthUser,
    cafe_id: i32,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    let customer = require_customer(state, user).await?;
    let cafe = require_open_cafe(&state.orm, cafe_id).await?;

    let customer_name = non_blank(payload.customer_name.as_deref())
        .ok_or_else(|| AppError::validation("Customer name is required"))?;
    let customer_phone = non_blank(payload.customer_phone.as_deref())
        .ok_or_else(|| AppError::validation("Customer phone is required"))?;
    let booking_date = non_blank(payload.booking_date.as_deref())
        .ok_or_else(|| AppError::validation("Booking date is required"))?;
    let booking_time = non_blank(payload.booking_time.as_deref())
        .ok_or_else(|| AppError::validation("Booking time is required"))?;
    let guests = match payload.guests {
        Some(g) if g > 0 => g,
        Some(_) => return Err(AppError::validation("Guests must be positive")),
        None => return Err(AppError::validation("Guests is required")),
    };

    let booking = BookingActive {
        id: NotSet,
        cafe_id: Set(cafe.id),
        customer_username: Set(Some(customer.username.clone())),
        customer_name: Set(customer_name),
        customer_phone: Set(customer_phone),
        booking_date: Set(booking_date),
        booking_time: Set(booking_time),
        guests: Set(guests),
        note: Set(payload.note),
        amenity_preference: Set(non_blank(payload.amenity_preference.as_deref())),
        allocated_table: Set(None),
        status: Set(bookings::STATUS_PENDING.to_string()),
        denial_reason: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(booking_id = booking.id, cafe_id = cafe.id, username = %customer.username, "booking created");
    Ok(ApiResponse::success(
        "Booking created",
        booking_from_entity(booking),
        Some(Meta::empty()),
    ))
}

/// Lists the caller's bookings newest first. Bookings made before they were tied
/// to accounts are claimed by phone number the first time this finds nothing.
pub async fn list_my_bookings(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<BookingList>> {
    let customer = require_customer(state, user).await?;

    let mut rows = bookings_of(state, &customer.username).await?;
    if rows.is_empty() {
        if let Some(phone) = non_blank(customer.phone.as_deref()) {
            let claimed = Bookings::update_many()
                .col_expr(
                    BookingCol::CustomerUsername,
                    Expr::value(customer.username.clone()),
                )
                .filter(BookingCol::CustomerPhone.eq(phone))
                .filter(
                    Condition::any()
                        .add(BookingCol::CustomerUsername.is_null())
                        .add(BookingCol::CustomerUsername.eq("")),
                )
                .exec(&state.orm)
                .await?
                .rows_affected;
            if claimed > 0 {
                tracing::info!(username = %customer.username, claimed, "legacy bookings claimed by phone");
                rows = bookings_of(state, &customer.username).await?;
            }
        }
    }

    let items = rows.into_iter().map(booking_from_entity).collect();
    Ok(ApiResponse::success("Bookings", BookingList { items }, Some(Meta::empty())))
}

async fn bookings_of(state: &AppState, username: &str) -> AppResult<Vec<BookingModel>> {
    let rows = Bookings::find()
        .filter(BookingCol::CustomerUsername.eq(username))
        .order_by_desc(BookingCol::CreatedAt)
        .order_by_desc(BookingCol::Id)
        .all(&state.orm)
        .await?;
    Ok(rows)
}

pub async fn delete_my_booking(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<Booking>> {
    let customer = require_customer(state, user).await?;
    let booking = match Bookings::find_by_id(id).one(&state.orm).await? {
        Some(b) => b,
        None => return Err(AppError::not_found("Booking not found")),
    };
    if booking.customer_username.as_deref() != Some(customer.username.as_str()) {
        return Err(AppError::forbidden("Forbidden"));
    }

    booking.clone().delete(&state.orm).await?;
    tracing::info!(booking_id = booking.id, username = %customer.username, "booking deleted by customer");
    Ok(ApiResponse::success(
        "Booking deleted",
        booking_from_entity(booking),
        Some(Meta::empty()),
    ))
}

pub async fn list_bookings(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<BookingList>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(c) => c,
        None => return Err(AppError::not_found("Cafe not found")),
    };

    let items = Bookings::find()
        .filter(BookingCol::CafeId.eq(cafe.id))
        .order_by_desc(BookingCol::CreatedAt)
        .order_by_desc(BookingCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(booking_from_entity)
        .collect();

    Ok(ApiResponse::success("Bookings", BookingList { items }, Some(Meta::empty())))
}

/// Accepts or denies a pending booking of the owner's cafe. A booking of another
/// cafe is reported as missing.
pub async fn decide_booking(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: DecideBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(c) => c,
        None => return Err(AppError::not_found("Cafe not found")),
    };

    let booking = Bookings::find_by_id(id)
        .filter(BookingCol::CafeId.eq(cafe.id))
        .one(&state.orm)
        .await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::not_found("Booking not found")),
    };
    if booking.status != bookings::STATUS_PENDING {
        return Err(AppError::state("Booking already decided"));
    }

    let mut active: BookingActive = booking.into();
    match payload.decision {
        BookingDecision::Accept => {
            active.status = Set(bookings::STATUS_ACCEPTED.to_string());
            active.allocated_table = Set(non_blank(payload.allocated_table.as_deref()));
        }
        BookingDecision::Deny => {
            active.status = Set(bookings::STATUS_DENIED.to_string());
            active.denial_reason = Set(non_blank(payload.reason.as_deref()));
        }
    }
    let booking = active.update(&state.orm).await?;

    tracing::info!(booking_id = booking.id, cafe_id = cafe.id, status = %booking.status, "booking decided");
    audit::record(
        state,
        Some(&owner.username),
        "booking_decide",
        "bookings",
        serde_json::json!({ "booking_id": booking.id, "status": booking.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking updated",
        booking_from_entity(booking),
        Some(Meta::empty()),
    ))
}

pub fn booking_from_entity(model: BookingModel) -> Booking {
    Booking {
        id: model.id,
        cafe_id: model.cafe_id,
        customer_username: model.customer_username,
        customer_name: model.customer_name,
        customer_phone: model.customer_phone,
        booking_date: model.booking_date,
        booking_time: model.booking_time,
        guests: model.guests,
        note: model.note,
        amenity_preference: model.amenity_preference,
        allocated_table: model.allocated_table,
        status: model.status,
        denial_reason: model.denial_reason,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
