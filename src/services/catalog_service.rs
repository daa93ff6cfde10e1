use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::{
    audit,
    db::is_unique_violation,
    dto::catalog::{
        CapacityList, CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest,
        UpsertCapacityRequest,
    },
    entity::{
        function_capacities::{
            ActiveModel as CapacityActive, Column as CapacityCol, Entity as FunctionCapacities,
            Model as CapacityModel,
        },
        menu_items::{ActiveModel as MenuActive, Column as MenuCol, Entity as MenuItems, Model as MenuModel},
        sea_orm_active_enums::FunctionType,
    },
    error::{AppError, AppResult},
    media::{UploadedFile, release_all},
    middleware::auth::AuthUser,
    models::{FunctionCapacity, MenuItem},
    response::{ApiResponse, Meta},
    services::{
        identity::non_blank,
        tenant::{find_owned_cafe, require_owned_cafe, require_owner},
    },
    state::AppState,
};

pub async fn list_menu(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<MenuItemList>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(c) => c,
        None => return Err(AppError::not_found("Cafe not found")),
    };
    let items = menu_for_cafe(&state.orm, cafe.id, false).await?;
    Ok(ApiResponse::success(
        "Menu items",
        MenuItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn menu_for_cafe<C: ConnectionTrait>(
    conn: &C,
    cafe_id: i32,
    available_only: bool,
) -> AppResult<Vec<MenuItem>> {
    let mut finder = MenuItems::find().filter(MenuCol::CafeId.eq(cafe_id));
    if available_only {
        finder = finder.filter(MenuCol::Available.eq(true));
    }
    let items = finder
        .order_by_asc(MenuCol::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect();
    Ok(items)
}

pub async fn create_menu_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let owner = require_owner(&state.orm, &user.username).await?;

    let name = non_blank(payload.name.as_deref()).ok_or_else(|| AppError::validation("Name is required"))?;
    let price = match payload.price {
        Some(p) if p < 0 => return Err(AppError::validation("Price must not be negative")),
        Some(p) => p,
        None => return Err(AppError::validation("Price is required")),
    };

    let cafe = require_owned_cafe(&state.orm, owner.id).await?;

    let item = MenuActive {
        id: NotSet,
        cafe_id: Set(cafe.id),
        name: Set(name),
        description: Set(non_blank(payload.description.as_deref())),
        price: Set(price),
        available: Set(payload.available.unwrap_or(true)),
        category: Set(non_blank(payload.category.as_deref())),
        image_filename: Set(None),
        image_content_type: Set(None),
        image_key: Set(None),
        image_size: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        Some(&owner.username),
        "menu_item_create",
        "menu_items",
        serde_json::json!({ "cafe_id": cafe.id, "menu_item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Menu item created",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    if matches!(payload.price, Some(p) if p < 0) {
        return Err(AppError::validation("Price must not be negative"));
    }
    if matches!(payload.name.as_deref(), Some(n) if n.trim().is_empty()) {
        return Err(AppError::validation("Name is required"));
    }

    let cafe = require_owned_cafe(&state.orm, owner.id).await?;
    let item = find_menu_item(&state.orm, cafe.id, id).await?;

    let mut active: MenuActive = item.into();
    if let Some(name) = non_blank(payload.name.as_deref()) {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(non_blank(Some(&description)));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(available) = payload.available {
        active.available = Set(available);
    }
    if let Some(category) = payload.category {
        active.category = Set(non_blank(Some(&category)));
    }
    let item = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Menu item updated",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<MenuItem>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = require_owned_cafe(&state.orm, owner.id).await?;
    let item = find_menu_item(&state.orm, cafe.id, id).await?;

    MenuItems::delete_by_id(item.id).exec(&state.orm).await?;
    if let Some(key) = item.image_key.clone() {
        release_all(state.media.as_ref(), vec![key]).await;
    }

    audit::record(
        state,
        Some(&owner.username),
        "menu_item_delete",
        "menu_items",
        serde_json::json!({ "cafe_id": cafe.id, "menu_item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Menu item deleted",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

/// Replaces the item image; the previous file is released afterwards.
pub async fn upload_menu_image(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    file: Option<UploadedFile>,
) -> AppResult<ApiResponse<MenuItem>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let file = match file.filter(|f| !f.is_empty()) {
        Some(f) => f,
        None => return Err(AppError::validation("Image file is required")),
    };
    let cafe = require_owned_cafe(&state.orm, owner.id).await?;
    let item = find_menu_item(&state.orm, cafe.id, id).await?;

    let key = state
        .media
        .put(&file.filename, &file.bytes)
        .await
        .map_err(AppError::Internal)?;

    let previous_key = item.image_key.clone();
    let mut active: MenuActive = item.into();
    active.image_filename = Set(Some(file.filename.clone()));
    active.image_content_type = Set(Some(file.content_type.clone()));
    active.image_key = Set(Some(key.clone()));
    active.image_size = Set(Some(file.size()));
    let item = match active.update(&state.orm).await {
        Ok(item) => item,
        Err(err) => {
            release_all(state.media.as_ref(), vec![key]).await;
            return Err(err.into());
        }
    };

    if let Some(previous_key) = previous_key {
        release_all(state.media.as_ref(), vec![previous_key]).await;
    }

    Ok(ApiResponse::success(
        "Menu image uploaded",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

/// Another cafe's item reads as missing.
pub async fn find_menu_item<C: ConnectionTrait>(conn: &C, cafe_id: i32, id: i32) -> AppResult<MenuModel> {
    let item = MenuItems::find_by_id(id).one(conn).await?;
    match item {
        Some(i) if i.cafe_id == cafe_id => Ok(i),
        _ => Err(AppError::not_found("Menu item not found")),
    }
}

pub async fn list_capacities(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CapacityList>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(c) => c,
        None => return Err(AppError::not_found("Cafe not found")),
    };
    let items = FunctionCapacities::find()
        .filter(CapacityCol::CafeId.eq(cafe.id))
        .order_by_asc(CapacityCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(capacity_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Function capacities",
        CapacityList { items },
        Some(Meta::empty()),
    ))
}

/// Keyed by (cafe, function type): updates the existing record or creates one.
pub async fn upsert_capacity(
    state: &AppState,
    user: &AuthUser,
    payload: UpsertCapacityRequest,
) -> AppResult<ApiResponse<FunctionCapacity>> {
    let owner = require_owner(&state.orm, &user.username).await?;

    let function_type: FunctionType = payload
        .function_type
        .parse()
        .map_err(|_| AppError::validation("Invalid function type"))?;
    let tables_available = match payload.tables_available {
        Some(t) if t < 0 => return Err(AppError::validation("Tables available must not be negative")),
        Some(t) => t,
        None => return Err(AppError::validation("Tables available is required")),
    };
    if matches!(payload.seats_available, Some(s) if s < 0) {
        return Err(AppError::validation("Seats available must not be negative"));
    }
    if matches!(payload.price, Some(p) if p < 0) {
        return Err(AppError::validation("Price must not be negative"));
    }

    let cafe = require_owned_cafe(&state.orm, owner.id).await?;

    let existing = FunctionCapacities::find()
        .filter(CapacityCol::CafeId.eq(cafe.id))
        .filter(CapacityCol::FunctionType.eq(function_type))
        .one(&state.orm)
        .await?;

    let saved = match existing {
        Some(capacity) => {
            let mut active: CapacityActive = capacity.into();
            active.tables_available = Set(tables_available);
            active.seats_available = Set(payload.seats_available);
            active.price = Set(payload.price);
            active.enabled = Set(payload.enabled.unwrap_or(true));
            active.update(&state.orm).await
        }
        None => {
            CapacityActive {
                id: NotSet,
                cafe_id: Set(cafe.id),
                function_type: Set(function_type),
                tables_available: Set(tables_available),
                seats_available: Set(payload.seats_available),
                price: Set(payload.price),
                enabled: Set(payload.enabled.unwrap_or(true)),
            }
            .insert(&state.orm)
            .await
        }
    };

    let saved = match saved {
        Ok(c) => c,
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::conflict("Capacity already exists for this function type"));
        }
        Err(err) => return Err(err.into()),
    };

    Ok(ApiResponse::success(
        "Function capacity saved",
        capacity_from_entity(saved),
        Some(Meta::empty()),
    ))
}

pub async fn delete_capacity(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<FunctionCapacity>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = require_owned_cafe(&state.orm, owner.id).await?;

    let capacity = FunctionCapacities::find_by_id(id).one(&state.orm).await?;
    let capacity = match capacity {
        Some(c) if c.cafe_id == cafe.id => c,
        _ => return Err(AppError::not_found("Function capacity not found")),
    };
    FunctionCapacities::delete_by_id(capacity.id)
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Function capacity deleted",
        capacity_from_entity(capacity),
        Some(Meta::empty()),
    ))
}

pub fn menu_image_url(cafe_id: i32, item_id: i32) -> String {
    format!("/api/public/cafes/{cafe_id}/menu/{item_id}/image")
}

pub fn menu_item_from_entity(model: MenuModel) -> MenuItem {
    MenuItem {
        image_url: model
            .image_key
            .as_ref()
            .map(|_| menu_image_url(model.cafe_id, model.id)),
        id: model.id,
        cafe_id: model.cafe_id,
        name: model.name,
        description: model.description,
        price: model.price,
        available: model.available,
        category: model.category,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn capacity_from_entity(model: CapacityModel) -> FunctionCapacity {
    FunctionCapacity {
        id: model.id,
        cafe_id: model.cafe_id,
        function_type: model.function_type,
        tables_available: model.tables_available,
        seats_available: model.seats_available,
        price: model.price,
        enabled: model.enabled,
    }
}
