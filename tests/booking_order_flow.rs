mod common;

use cafe_hub_api::{
    dto::{
        bookings::{BookingDecision, CreateBookingRequest, DecideBookingRequest},
        catalog::{CreateMenuItemRequest, UpdateMenuItemRequest},
        orders::{CreateOrderRequest, OrderLineRequest},
    },
    entity::{
        OrderItems, Orders,
        bookings::{self, ActiveModel as BookingActive},
    },
    middleware::auth::AuthUser,
    services::{booking_service, catalog_service, order_service, owner_service, public_service},
};
use chrono::Utc;
use common::{TestContext, seed_admin, seed_customer, seed_open_cafe, setup, upload};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, EntityTrait, PaginatorTrait, Set};

fn booking_request(phone: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        customer_name: Some("Meera".to_string()),
        customer_phone: Some(phone.to_string()),
        booking_date: Some("2026-12-24".to_string()),
        booking_time: Some("20:30".to_string()),
        guests: Some(4),
        note: Some("window seat".to_string()),
        amenity_preference: None,
    }
}

fn order_request(lines: Vec<(i32, i32)>) -> CreateOrderRequest {
    CreateOrderRequest {
        customer_name: Some("Meera".to_string()),
        customer_phone: Some("9800000000".to_string()),
        amenity_preference: None,
        items: lines
            .into_iter()
            .map(|(menu_item_id, qty)| OrderLineRequest { menu_item_id, qty })
            .collect(),
    }
}

async fn menu_item(ctx: &TestContext, owner: &AuthUser, name: &str, price: i64) -> anyhow::Result<i32> {
    let item = catalog_service::create_menu_item(
        &ctx.state,
        owner,
        CreateMenuItemRequest {
            name: Some(name.to_string()),
            price: Some(price),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("item");
    Ok(item.id)
}

/// A booking from before bookings were tied to accounts.
async fn legacy_booking(
    ctx: &TestContext,
    cafe_id: i32,
    phone: &str,
    username: Option<&str>,
) -> anyhow::Result<bookings::Model> {
    let booking = BookingActive {
        id: NotSet,
        cafe_id: Set(cafe_id),
        customer_username: Set(username.map(str::to_string)),
        customer_name: Set("Walk-in".to_string()),
        customer_phone: Set(phone.to_string()),
        booking_date: Set("2025-01-01".to_string()),
        booking_time: Set("18:00".to_string()),
        guests: Set(2),
        note: Set(None),
        amenity_preference: Set(None),
        allocated_table: Set(None),
        status: Set(bookings::STATUS_PENDING.to_string()),
        denial_reason: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&ctx.state.orm)
    .await?;
    Ok(booking)
}

#[tokio::test]
async fn bookings_require_every_field_in_order() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (_, cafe) = seed_open_cafe(&ctx, &admin, "ishaan", "Ishaan's").await?;
    let customer = seed_customer(&ctx, "meera", "9800000000").await?;

    let mut req = booking_request("9800000000");
    req.customer_name = None;
    req.guests = None;
    let err = booking_service::create_booking(&ctx.state, &customer, cafe.id, req)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Customer name is required");

    let mut req = booking_request("9800000000");
    req.booking_time = Some(" ".to_string());
    let err = booking_service::create_booking(&ctx.state, &customer, cafe.id, req)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Booking time is required");

    let mut req = booking_request("9800000000");
    req.guests = Some(0);
    let err = booking_service::create_booking(&ctx.state, &customer, cafe.id, req)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Guests must be positive");

    let booking = booking_service::create_booking(&ctx.state, &customer, cafe.id, booking_request("9800000000"))
        .await?
        .data
        .expect("booking");
    assert_eq!(booking.status, bookings::STATUS_PENDING);
    assert_eq!(booking.customer_username.as_deref(), Some("meera"));

    let err = booking_service::create_booking(&ctx.state, &customer, cafe.id + 50, booking_request("9800000000"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
    Ok(())
}

#[tokio::test]
async fn pending_cafes_take_no_bookings_or_orders() -> anyhow::Result<()> {
    let ctx = setup().await?;
    common::seed_user(
        &ctx,
        "jaya",
        cafe_hub_api::entity::sea_orm_active_enums::Role::Owner,
        Some(cafe_hub_api::entity::sea_orm_active_enums::ApprovalStatus::Approved),
        None,
    )
    .await?;
    let owner = AuthUser::new("jaya");
    let cafe = owner_service::upsert_cafe(
        &ctx.state,
        &owner,
        cafe_hub_api::dto::cafe::CafeProfileRequest {
            cafe_name: Some("Jaya's".to_string()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("cafe");
    let item = menu_item(&ctx, &owner, "Tea", 1500).await?;
    let customer = seed_customer(&ctx, "meera", "9800000000").await?;

    let err = booking_service::create_booking(&ctx.state, &customer, cafe.id, booking_request("9800000000"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cafe not found");
    let err = order_service::create_order(&ctx.state, &customer, cafe.id, order_request(vec![(item, 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cafe not found");
    assert!(public_service::list_cafes(&ctx.state).await?.data.expect("cafes").is_empty());
    Ok(())
}

#[tokio::test]
async fn legacy_bookings_are_claimed_by_phone_once() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (_, cafe) = seed_open_cafe(&ctx, &admin, "kabir", "Kabir's").await?;
    let customer = seed_customer(&ctx, "meera", "9800000000").await?;
    seed_customer(&ctx, "nikhil", "9811111111").await?;

    let unclaimed = legacy_booking(&ctx, cafe.id, "9800000000", None).await?;
    let blank = legacy_booking(&ctx, cafe.id, "9800000000", Some("")).await?;
    let someone_elses = legacy_booking(&ctx, cafe.id, "9800000000", Some("nikhil")).await?;
    legacy_booking(&ctx, cafe.id, "9999999999", None).await?;

    let mine = booking_service::list_my_bookings(&ctx.state, &customer)
        .await?
        .data
        .expect("bookings")
        .items;
    let mut ids: Vec<i32> = mine.iter().map(|b| b.id).collect();
    ids.sort();
    assert_eq!(ids, vec![unclaimed.id, blank.id]);
    assert!(mine.iter().all(|b| b.customer_username.as_deref() == Some("meera")));

    let stored = bookings::Entity::find_by_id(someone_elses.id)
        .one(&ctx.state.orm)
        .await?
        .expect("booking");
    assert_eq!(stored.customer_username.as_deref(), Some("nikhil"));

    // a second call finds the claimed rows and leaves the rest alone
    let again = booking_service::list_my_bookings(&ctx.state, &customer)
        .await?
        .data
        .expect("bookings")
        .items;
    assert_eq!(again.len(), 2);
    Ok(())
}

#[tokio::test]
async fn customers_delete_only_their_own_bookings() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (_, cafe) = seed_open_cafe(&ctx, &admin, "leela", "Leela's").await?;
    let meera = seed_customer(&ctx, "meera", "9800000000").await?;
    let nikhil = seed_customer(&ctx, "nikhil", "9811111111").await?;

    let booking = booking_service::create_booking(&ctx.state, &meera, cafe.id, booking_request("9800000000"))
        .await?
        .data
        .expect("booking");

    let err = booking_service::delete_my_booking(&ctx.state, &nikhil, booking.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "forbidden");

    let err = booking_service::delete_my_booking(&ctx.state, &meera, booking.id + 1)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Booking not found");

    booking_service::delete_my_booking(&ctx.state, &meera, booking.id).await?;
    assert_eq!(bookings::Entity::find().count(&ctx.state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn owners_decide_pending_bookings_of_their_cafe_once() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, cafe) = seed_open_cafe(&ctx, &admin, "manoj", "Manoj's").await?;
    let (other_owner, _) = seed_open_cafe(&ctx, &admin, "nina", "Nina's").await?;
    let customer = seed_customer(&ctx, "meera", "9800000000").await?;

    let first = booking_service::create_booking(&ctx.state, &customer, cafe.id, booking_request("9800000000"))
        .await?
        .data
        .expect("booking");
    let second = booking_service::create_booking(&ctx.state, &customer, cafe.id, booking_request("9800000000"))
        .await?
        .data
        .expect("booking");

    let err = booking_service::decide_booking(
        &ctx.state,
        &other_owner,
        first.id,
        DecideBookingRequest {
            decision: BookingDecision::Accept,
            allocated_table: None,
            reason: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Booking not found");

    let accepted = booking_service::decide_booking(
        &ctx.state,
        &owner,
        first.id,
        DecideBookingRequest {
            decision: BookingDecision::Accept,
            allocated_table: Some("T4".to_string()),
            reason: None,
        },
    )
    .await?
    .data
    .expect("booking");
    assert_eq!(accepted.status, bookings::STATUS_ACCEPTED);
    assert_eq!(accepted.allocated_table.as_deref(), Some("T4"));

    let denied = booking_service::decide_booking(
        &ctx.state,
        &owner,
        second.id,
        DecideBookingRequest {
            decision: BookingDecision::Deny,
            allocated_table: None,
            reason: Some("Fully booked".to_string()),
        },
    )
    .await?
    .data
    .expect("booking");
    assert_eq!(denied.status, bookings::STATUS_DENIED);
    assert_eq!(denied.denial_reason.as_deref(), Some("Fully booked"));

    let err = booking_service::decide_booking(
        &ctx.state,
        &owner,
        first.id,
        DecideBookingRequest {
            decision: BookingDecision::Deny,
            allocated_table: None,
            reason: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "invalid_state");
    assert_eq!(err.to_string(), "Booking already decided");

    let listed = booking_service::list_bookings(&ctx.state, &owner)
        .await?
        .data
        .expect("bookings")
        .items;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    let others = booking_service::list_bookings(&ctx.state, &other_owner)
        .await?
        .data
        .expect("bookings")
        .items;
    assert!(others.is_empty());
    Ok(())
}

#[tokio::test]
async fn order_lines_are_snapshotted_at_placement() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, cafe) = seed_open_cafe(&ctx, &admin, "omkar", "Omkar's").await?;
    let customer = seed_customer(&ctx, "meera", "9800000000").await?;
    let coffee = menu_item(&ctx, &owner, "Coffee", 6000).await?;
    let cake = menu_item(&ctx, &owner, "Cake", 12000).await?;

    let placed = order_service::create_order(
        &ctx.state,
        &customer,
        cafe.id,
        order_request(vec![(coffee, 2), (cake, 1)]),
    )
    .await?
    .data
    .expect("order");
    assert_eq!(placed.order.total_amount, 24000);
    assert_eq!(placed.order.status, "PLACED");
    assert_eq!(placed.items.len(), 2);

    catalog_service::update_menu_item(
        &ctx.state,
        &owner,
        coffee,
        UpdateMenuItemRequest {
            name: Some("Cold coffee".to_string()),
            price: Some(9000),
            ..Default::default()
        },
    )
    .await?;

    let mine = order_service::list_my_orders(&ctx.state, &customer)
        .await?
        .data
        .expect("orders")
        .items;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].order.total_amount, 24000);
    let coffee_line = mine[0]
        .items
        .iter()
        .find(|line| line.menu_item_id == coffee)
        .expect("coffee line");
    assert_eq!(coffee_line.item_name, "Coffee");
    assert_eq!(coffee_line.price, 6000);
    assert_eq!(coffee_line.qty, 2);

    let owner_view = order_service::list_orders(&ctx.state, &owner)
        .await?
        .data
        .expect("orders")
        .items;
    assert_eq!(owner_view.len(), 1);
    assert_eq!(owner_view[0].order.id, placed.order.id);
    Ok(())
}

#[tokio::test]
async fn orders_reject_foreign_items_and_bad_quantities() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, cafe) = seed_open_cafe(&ctx, &admin, "pooja", "Pooja's").await?;
    let (other_owner, _) = seed_open_cafe(&ctx, &admin, "qadir", "Qadir's").await?;
    let customer = seed_customer(&ctx, "meera", "9800000000").await?;
    let mine = menu_item(&ctx, &owner, "Sandwich", 8000).await?;
    let foreign = menu_item(&ctx, &other_owner, "Burger", 9000).await?;

    let err = order_service::create_order(&ctx.state, &customer, cafe.id, order_request(Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Items are required");

    let err = order_service::create_order(&ctx.state, &customer, cafe.id, order_request(vec![(mine, 0)]))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Quantity must be positive");

    let err = order_service::create_order(
        &ctx.state,
        &customer,
        cafe.id,
        order_request(vec![(mine, 1), (foreign, 1)]),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "validation_failed");
    assert_eq!(
        err.to_string(),
        format!("Menu item {foreign} does not belong to this cafe")
    );

    let mut req = order_request(vec![(mine, 1)]);
    req.customer_phone = None;
    let err = order_service::create_order(&ctx.state, &customer, cafe.id, req)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Customer phone is required");

    assert_eq!(Orders::find().count(&ctx.state.orm).await?, 0);
    assert_eq!(OrderItems::find().count(&ctx.state.orm).await?, 0);

    // owners cannot place orders
    let err = order_service::create_order(&ctx.state, &owner, cafe.id, order_request(vec![(mine, 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "forbidden");
    Ok(())
}

#[tokio::test]
async fn public_directory_prefers_the_flagged_cover() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (flagged_owner, flagged) = seed_open_cafe(&ctx, &admin, "rhea", "Rhea's").await?;
    let (plain_owner, plain) = seed_open_cafe(&ctx, &admin, "sahil", "Sahil's").await?;
    let (_, bare) = seed_open_cafe(&ctx, &admin, "tanvi", "Tanvi's").await?;

    owner_service::upload_image(&ctx.state, &flagged_owner, Some(upload("a.jpg", b"a")), false).await?;
    let cover = owner_service::upload_image(&ctx.state, &flagged_owner, Some(upload("b.jpg", b"b")), true)
        .await?
        .data
        .expect("image");
    let oldest = owner_service::upload_image(&ctx.state, &plain_owner, Some(upload("c.jpg", b"c")), false)
        .await?
        .data
        .expect("image");
    owner_service::upload_image(&ctx.state, &plain_owner, Some(upload("d.jpg", b"d")), false).await?;

    let cafes = public_service::list_cafes(&ctx.state).await?.data.expect("cafes");
    assert_eq!(cafes.len(), 3);
    let url_of = |id: i32| {
        cafes
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.cover_image_url.clone())
    };
    assert_eq!(
        url_of(flagged.id),
        Some(format!("/api/public/cafes/{}/images/{}", flagged.id, cover.id))
    );
    assert_eq!(
        url_of(plain.id),
        Some(format!("/api/public/cafes/{}/images/{}", plain.id, oldest.id))
    );
    assert_eq!(url_of(bare.id), None);

    let detail = public_service::get_cafe(&ctx.state, flagged.id)
        .await?
        .data
        .expect("cafe");
    assert_eq!(detail.cover_image_url, url_of(flagged.id));

    let bytes = public_service::image_bytes(&ctx.state, flagged.id, cover.id).await?;
    assert_eq!(bytes.bytes, b"b");
    let err = public_service::image_bytes(&ctx.state, plain.id, cover.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
    Ok(())
}

#[tokio::test]
async fn oversized_order_totals_are_rejected_not_wrapped() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, cafe) = seed_open_cafe(&ctx, &admin, "umar", "Umar's").await?;
    let customer = seed_customer(&ctx, "meera", "9800000000").await?;
    let banquet = menu_item(&ctx, &owner, "Banquet", 5_000_000_000).await?;

    // single line overflows on the multiplication
    let err = order_service::create_order(
        &ctx.state,
        &customer,
        cafe.id,
        order_request(vec![(banquet, 2_000_000_000)]),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "validation_failed");
    assert_eq!(err.to_string(), "Order total too large");

    // each line fits, the running sum does not
    let big = menu_item(&ctx, &owner, "Estate", i64::MAX / 2).await?;
    let err = order_service::create_order(
        &ctx.state,
        &customer,
        cafe.id,
        order_request(vec![(big, 1), (big, 1), (banquet, 1)]),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Order total too large");

    assert_eq!(Orders::find().count(&ctx.state.orm).await?, 0);
    assert_eq!(OrderItems::find().count(&ctx.state.orm).await?, 0);
    Ok(())
}
