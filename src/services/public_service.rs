//! Read-only views of approved and active cafes. Anything else reads as missing.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;

use crate::{
    dto::{cafe::CafeImageList, catalog::MenuItemList},
    entity::{
        cafe_images::{Column as ImageCol, Entity as CafeImages},
        cafes::{self, Column as CafeCol, Entity as Cafes},
        sea_orm_active_enums::ApprovalStatus,
    },
    error::{AppError, AppResult},
    media::Download,
    models::PublicCafe,
    response::{ApiResponse, Meta},
    services::{
        cafe_media,
        catalog_service::{find_menu_item, menu_for_cafe},
        tenant::require_open_cafe,
    },
    state::AppState,
};

pub async fn list_cafes(state: &AppState) -> AppResult<ApiResponse<Vec<PublicCafe>>> {
    let cafes = Cafes::find()
        .filter(CafeCol::Active.eq(true))
        .filter(CafeCol::ApprovalStatus.eq(ApprovalStatus::Approved))
        .order_by_asc(CafeCol::Id)
        .all(&state.orm)
        .await?;

    let ids: Vec<i32> = cafes.iter().map(|c| c.id).collect();
    let mut covers: HashMap<i32, (bool, i32)> = HashMap::new();
    if !ids.is_empty() {
        let images = CafeImages::find()
            .filter(ImageCol::CafeId.is_in(ids))
            .order_by_asc(ImageCol::Id)
            .all(&state.orm)
            .await?;
        for image in images {
            // Flagged cover wins, then the oldest image.
            match covers.get(&image.cafe_id) {
                Some((true, _)) => {}
                Some((false, _)) if !image.cover => {}
                _ => {
                    covers.insert(image.cafe_id, (image.cover, image.id));
                }
            }
        }
    }

    let items = cafes
        .into_iter()
        .map(|c| {
            let cover = covers
                .get(&c.id)
                .map(|(_, image_id)| cafe_media::image_url(c.id, *image_id));
            public_cafe(c, cover)
        })
        .collect();

    Ok(ApiResponse::success("Cafes", items, Some(Meta::empty())))
}

pub async fn get_cafe(state: &AppState, cafe_id: i32) -> AppResult<ApiResponse<PublicCafe>> {
    let cafe = require_open_cafe(&state.orm, cafe_id).await?;
    let images = CafeImages::find()
        .filter(ImageCol::CafeId.eq(cafe.id))
        .order_by_desc(ImageCol::Cover)
        .order_by_asc(ImageCol::Id)
        .one(&state.orm)
        .await?;
    let cover = images.map(|i| cafe_media::image_url(cafe.id, i.id));
    Ok(ApiResponse::success("Cafe found", public_cafe(cafe, cover), Some(Meta::empty())))
}

pub async fn menu(state: &AppState, cafe_id: i32) -> AppResult<ApiResponse<MenuItemList>> {
    let cafe = require_open_cafe(&state.orm, cafe_id).await?;
    let items = menu_for_cafe(&state.orm, cafe.id, true).await?;
    Ok(ApiResponse::success("Menu items", MenuItemList { items }, Some(Meta::empty())))
}

pub async fn images(state: &AppState, cafe_id: i32) -> AppResult<ApiResponse<CafeImageList>> {
    let cafe = require_open_cafe(&state.orm, cafe_id).await?;
    let items = cafe_media::list_images(&state.orm, cafe.id).await?;
    Ok(ApiResponse::success("Cafe images", CafeImageList { items }, Some(Meta::empty())))
}

pub async fn image_bytes(state: &AppState, cafe_id: i32, image_id: i32) -> AppResult<Download> {
    let cafe = require_open_cafe(&state.orm, cafe_id).await?;
    cafe_media::download_image(state, cafe.id, image_id).await
}

pub async fn menu_image_bytes(state: &AppState, cafe_id: i32, item_id: i32) -> AppResult<Download> {
    let cafe = require_open_cafe(&state.orm, cafe_id).await?;
    let item = find_menu_item(&state.orm, cafe.id, item_id).await?;
    // hidden from the public menu, so hidden here too
    if !item.available {
        return Err(AppError::not_found("Menu item not found"));
    }
    let key = match item.image_key {
        Some(k) => k,
        None => return Err(AppError::not_found("Image not found")),
    };
    let bytes = cafe_media::fetch(state.media.as_ref(), &key).await?;
    Ok(Download {
        filename: item
            .image_filename
            .unwrap_or_else(|| format!("menu-{}", item.id)),
        content_type: item
            .image_content_type
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        bytes,
    })
}

fn public_cafe(model: cafes::Model, cover_image_url: Option<String>) -> PublicCafe {
    PublicCafe {
        id: model.id,
        cafe_name: model.cafe_name,
        description: model.description,
        city: model.city,
        address_line: model.address_line,
        opening_time: model.opening_time,
        closing_time: model.closing_time,
        phone: model.phone,
        cover_image_url,
    }
}
