//! Owner to cafe resolution, roster membership and the cafe teardown cascade.

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};

use crate::{
    dto::{admin::TeardownReport, cafe::CafeProfileRequest},
    entity::{
        bookings::{Column as BookingCol, Entity as Bookings},
        cafe_documents::{Column as CafeDocCol, Entity as CafeDocuments},
        cafe_images::{Column as ImageCol, Entity as CafeImages},
        cafe_staff::{Column as StaffCol, Entity as CafeStaff},
        cafes::{self, ActiveModel as CafeActive, Column as CafeCol, Entity as Cafes},
        function_capacities::{Column as CapacityCol, Entity as FunctionCapacities},
        menu_items::{Column as MenuCol, Entity as MenuItems},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
        sea_orm_active_enums::Role,
        users,
    },
    error::{AppError, AppResult},
    media::release_all,
    models::Cafe,
    services::identity::{non_blank, require_actor},
    state::AppState,
};

pub async fn require_owner<C: ConnectionTrait>(conn: &C, username: &str) -> AppResult<users::Model> {
    require_actor(conn, username, &[Role::Owner]).await
}

pub async fn find_owned_cafe<C: ConnectionTrait>(
    conn: &C,
    owner_id: i32,
) -> AppResult<Option<cafes::Model>> {
    let cafe = Cafes::find()
        .filter(CafeCol::OwnerId.eq(owner_id))
        .one(conn)
        .await?;
    Ok(cafe)
}

/// For mutations that need the profile to exist first.
pub async fn require_owned_cafe<C: ConnectionTrait>(conn: &C, owner_id: i32) -> AppResult<cafes::Model> {
    match find_owned_cafe(conn, owner_id).await? {
        Some(c) => Ok(c),
        None => Err(AppError::state("Create cafe profile first")),
    }
}

/// Public-facing lookup: hidden cafes are reported as missing.
pub async fn require_open_cafe<C: ConnectionTrait>(conn: &C, cafe_id: i32) -> AppResult<cafes::Model> {
    match Cafes::find_by_id(cafe_id).one(conn).await? {
        Some(c) if c.is_open() => Ok(c),
        _ => Err(AppError::not_found("Cafe not found")),
    }
}

/// Drops a single roster link. The staff user is left untouched.
pub async fn remove_membership<C: ConnectionTrait>(
    conn: &C,
    cafe_id: i32,
    user_id: i32,
) -> Result<bool, DbErr> {
    let res = CafeStaff::delete_many()
        .filter(StaffCol::CafeId.eq(cafe_id))
        .filter(StaffCol::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(res.rows_affected > 0)
}

/// Removes the user from every roster that lists them.
pub async fn remove_from_all_rosters<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64, DbErr> {
    let memberships = CafeStaff::find()
        .filter(StaffCol::UserId.eq(user_id))
        .all(conn)
        .await?;
    let mut removed = 0;
    for membership in memberships {
        if remove_membership(conn, membership.cafe_id, membership.user_id).await? {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Deletes a cafe and everything scoped to it. Database rows go in one
/// transaction; media handles are released after commit and failures there
/// only produce orphans.
pub async fn teardown_cafe(state: &AppState, cafe: cafes::Model) -> AppResult<TeardownReport> {
    let cafe_id = cafe.id;
    let txn = state.orm.begin().await?;

    let members: Vec<i32> = CafeStaff::find()
        .select_only()
        .column(StaffCol::UserId)
        .filter(StaffCol::CafeId.eq(cafe_id))
        .into_tuple()
        .all(&txn)
        .await?;
    let mut staff_released = 0;
    for user_id in members {
        if remove_membership(&txn, cafe_id, user_id).await? {
            staff_released += 1;
        }
    }

    let mut media_keys: Vec<String> = CafeImages::find()
        .select_only()
        .column(ImageCol::StorageKey)
        .filter(ImageCol::CafeId.eq(cafe_id))
        .into_tuple()
        .all(&txn)
        .await?;
    let images_deleted = CafeImages::delete_many()
        .filter(ImageCol::CafeId.eq(cafe_id))
        .exec(&txn)
        .await?
        .rows_affected;

    let capacities_deleted = FunctionCapacities::delete_many()
        .filter(CapacityCol::CafeId.eq(cafe_id))
        .exec(&txn)
        .await?
        .rows_affected;

    let menu_image_keys: Vec<Option<String>> = MenuItems::find()
        .select_only()
        .column(MenuCol::ImageKey)
        .filter(MenuCol::CafeId.eq(cafe_id))
        .into_tuple()
        .all(&txn)
        .await?;
    media_keys.extend(menu_image_keys.into_iter().flatten());
    let menu_items_deleted = MenuItems::delete_many()
        .filter(MenuCol::CafeId.eq(cafe_id))
        .exec(&txn)
        .await?
        .rows_affected;

    let document_keys: Vec<String> = CafeDocuments::find()
        .select_only()
        .column(CafeDocCol::StorageKey)
        .filter(CafeDocCol::CafeId.eq(cafe_id))
        .into_tuple()
        .all(&txn)
        .await?;
    media_keys.extend(document_keys);
    let documents_deleted = CafeDocuments::delete_many()
        .filter(CafeDocCol::CafeId.eq(cafe_id))
        .exec(&txn)
        .await?
        .rows_affected;

    let bookings_deleted = Bookings::delete_many()
        .filter(BookingCol::CafeId.eq(cafe_id))
        .exec(&txn)
        .await?
        .rows_affected;

    let order_ids: Vec<i32> = Orders::find()
        .select_only()
        .column(OrderCol::Id)
        .filter(OrderCol::CafeId.eq(cafe_id))
        .into_tuple()
        .all(&txn)
        .await?;
    if !order_ids.is_empty() {
        OrderItems::delete_many()
            .filter(OrderItemCol::OrderId.is_in(order_ids))
            .exec(&txn)
            .await?;
    }
    let orders_deleted = Orders::delete_many()
        .filter(OrderCol::CafeId.eq(cafe_id))
        .exec(&txn)
        .await?
        .rows_affected;

    Cafes::delete_by_id(cafe_id).exec(&txn).await?;
    txn.commit().await?;

    let orphaned_media = release_all(state.media.as_ref(), media_keys).await;

    tracing::info!(
        cafe_id,
        staff_released,
        images_deleted,
        menu_items_deleted,
        capacities_deleted,
        orphans = orphaned_media.len(),
        "cafe deleted"
    );

    Ok(TeardownReport {
        cafe_id,
        staff_released,
        images_deleted,
        menu_items_deleted,
        capacities_deleted,
        documents_deleted,
        bookings_deleted,
        orders_deleted,
        orphaned_media,
    })
}

/// Copies every present, non-blank field onto the cafe, plus the `active` flag when given.
pub fn apply_profile(active: &mut CafeActive, req: &CafeProfileRequest) {
    macro_rules! overwrite {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(value) = non_blank(req.$field.as_deref()) {
                    active.$field = Set(Some(value));
                }
            )*
        };
    }
    if let Some(name) = non_blank(req.cafe_name.as_deref()) {
        active.cafe_name = Set(name);
    }
    if let Some(flag) = req.active {
        active.active = Set(flag);
    }
    overwrite!(
        owner_names,
        poc_designation,
        description,
        phone,
        email,
        whatsapp_number,
        address_line,
        city,
        state,
        pincode,
        opening_time,
        closing_time,
        fssai_number,
        pan_number,
        gstin,
        shop_license_number,
        bank_account_number,
        bank_ifsc,
        bank_account_holder_name,
    );
    active.updated_at = Set(Utc::now().into());
}

pub fn cafe_from_entity(model: cafes::Model, owner_username: Option<String>) -> Cafe {
    Cafe {
        id: model.id,
        owner_id: model.owner_id,
        owner_username,
        cafe_name: model.cafe_name,
        owner_names: model.owner_names,
        poc_designation: model.poc_designation,
        description: model.description,
        phone: model.phone,
        email: model.email,
        whatsapp_number: model.whatsapp_number,
        address_line: model.address_line,
        city: model.city,
        state: model.state,
        pincode: model.pincode,
        opening_time: model.opening_time,
        closing_time: model.closing_time,
        fssai_number: model.fssai_number,
        pan_number: model.pan_number,
        gstin: model.gstin,
        shop_license_number: model.shop_license_number,
        bank_account_number: model.bank_account_number,
        bank_ifsc: model.bank_ifsc,
        bank_account_holder_name: model.bank_account_holder_name,
        active: model.active,
        approval_status: model.approval_status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
