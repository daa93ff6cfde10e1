use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::{cafe::CafeImageList, catalog::MenuItemList},
    error::AppResult,
    media::Download,
    models::PublicCafe,
    response::ApiResponse,
    services::public_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cafes", get(list_cafes))
        .route("/cafes/{id}", get(get_cafe))
        .route("/cafes/{id}/menu", get(menu))
        .route("/cafes/{id}/menu/{item_id}/image", get(menu_image))
        .route("/cafes/{id}/images", get(images))
        .route("/cafes/{id}/images/{image_id}", get(image))
}

#[utoipa::path(
    get,
    path = "/api/public/cafes",
    responses((status = 200, description = "Approved and active cafes", body = ApiResponse<Vec<PublicCafe>>)),
    tag = "Public"
)]
pub async fn list_cafes(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<PublicCafe>>>> {
    let resp = public_service::list_cafes(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/public/cafes/{id}",
    params(("id" = i32, Path, description = "Cafe ID")),
    responses(
        (status = 200, description = "Cafe card", body = ApiResponse<PublicCafe>),
        (status = 404, description = "Cafe not found")
    ),
    tag = "Public"
)]
pub async fn get_cafe(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<PublicCafe>>> {
    let resp = public_service::get_cafe(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/public/cafes/{id}/menu",
    params(("id" = i32, Path, description = "Cafe ID")),
    responses(
        (status = 200, description = "Available menu items", body = ApiResponse<MenuItemList>),
        (status = 404, description = "Cafe not found")
    ),
    tag = "Public"
)]
pub async fn menu(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let resp = public_service::menu(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/public/cafes/{id}/menu/{item_id}/image",
    params(
        ("id" = i32, Path, description = "Cafe ID"),
        ("item_id" = i32, Path, description = "Menu item ID")
    ),
    responses(
        (status = 200, description = "Menu item image bytes"),
        (status = 404, description = "Not Found")
    ),
    tag = "Public"
)]
pub async fn menu_image(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i32, i32)>,
) -> AppResult<Download> {
    public_service::menu_image_bytes(&state, id, item_id).await
}

#[utoipa::path(
    get,
    path = "/api/public/cafes/{id}/images",
    params(("id" = i32, Path, description = "Cafe ID")),
    responses(
        (status = 200, description = "Cafe images", body = ApiResponse<CafeImageList>),
        (status = 404, description = "Cafe not found")
    ),
    tag = "Public"
)]
pub async fn images(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<CafeImageList>>> {
    let resp = public_service::images(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/public/cafes/{id}/images/{image_id}",
    params(
        ("id" = i32, Path, description = "Cafe ID"),
        ("image_id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "Not Found")
    ),
    tag = "Public"
)]
pub async fn image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(i32, i32)>,
) -> AppResult<Download> {
    public_service::image_bytes(&state, id, image_id).await
}
