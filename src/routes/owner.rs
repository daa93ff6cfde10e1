use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::{
    dto::{
        admin::TeardownReport,
        bookings::{BookingList, DecideBookingRequest},
        cafe::{
            CafeDocumentList, CafeImageList, CafeProfileRequest, ImageUploadQuery,
            StaffCreateRequest, StaffCreated, StaffList,
        },
        catalog::{
            CapacityList, CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest,
            UpsertCapacityRequest,
        },
        orders::OrderList,
    },
    error::AppResult,
    media::Download,
    middleware::auth::AuthUser,
    models::{Booking, Cafe, CafeDocument, CafeImage, FunctionCapacity, MenuItem, StaffMember},
    response::ApiResponse,
    routes::MultipartForm,
    services::{booking_service, catalog_service, order_service, owner_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cafe", get(get_cafe).put(upsert_cafe).delete(delete_cafe))
        .route("/staff", get(list_staff).post(create_staff))
        .route("/staff/{id}", delete(delete_staff))
        .route("/images", get(list_images).post(upload_image))
        .route("/images/{id}", delete(delete_image))
        .route("/documents", get(list_documents))
        .route("/documents/{doc_key}", put(upload_document))
        .route("/documents/{id}/download", get(download_document))
        .route("/menu", get(list_menu).post(create_menu_item))
        .route("/menu/{id}", put(update_menu_item).delete(delete_menu_item))
        .route("/menu/{id}/image", post(upload_menu_image))
        .route("/capacities", get(list_capacities).put(upsert_capacity))
        .route("/capacities/{id}", delete(delete_capacity))
        .route("/bookings", get(list_bookings))
        .route("/bookings/{id}/decision", post(decide_booking))
        .route("/orders", get(list_orders))
}

#[utoipa::path(
    get,
    path = "/api/owner/cafe",
    responses(
        (status = 200, description = "Own cafe profile", body = ApiResponse<Cafe>),
        (status = 404, description = "No cafe yet")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn get_cafe(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Cafe>>> {
    let resp = owner_service::get_cafe(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/owner/cafe",
    request_body = CafeProfileRequest,
    responses(
        (status = 200, description = "Cafe created or updated", body = ApiResponse<Cafe>),
        (status = 400, description = "Cafe name is required"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn upsert_cafe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CafeProfileRequest>,
) -> AppResult<Json<ApiResponse<Cafe>>> {
    let resp = owner_service::upsert_cafe(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/owner/cafe",
    responses(
        (status = 200, description = "Cafe and everything it owns removed", body = ApiResponse<TeardownReport>),
        (status = 404, description = "No cafe")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn delete_cafe(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<TeardownReport>>> {
    let resp = owner_service::delete_cafe(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/owner/staff",
    responses((status = 200, description = "Staff roster", body = ApiResponse<StaffList>)),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn list_staff(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<StaffList>>> {
    let resp = owner_service::list_staff(&state, &user).await?;
    Ok(Json(resp))
}

/// Multipart: a `data` part with the staff JSON and optional document files.
#[utoipa::path(
    post,
    path = "/api/owner/staff",
    request_body(content = StaffCreateRequest, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Staff member created", body = ApiResponse<StaffCreated>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email, phone or username already exists"),
        (status = 422, description = "Create cafe profile first")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn create_staff(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<StaffCreated>>)> {
    let form = MultipartForm::read(multipart).await?;
    let payload: StaffCreateRequest = form.payload()?;
    let resp = owner_service::create_staff(&state, &user, payload, form.files).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/owner/staff/{id}",
    params(("id" = i32, Path, description = "Staff user ID")),
    responses(
        (status = 200, description = "Staff member deleted", body = ApiResponse<StaffMember>),
        (status = 404, description = "Not on this roster")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn delete_staff(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<StaffMember>>> {
    let resp = owner_service::delete_staff(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/owner/images",
    responses((status = 200, description = "Cafe images", body = ApiResponse<CafeImageList>)),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn list_images(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CafeImageList>>> {
    let resp = owner_service::list_images(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/owner/images",
    params(("cover" = Option<bool>, Query, description = "Make this the cover image")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = ApiResponse<CafeImage>),
        (status = 400, description = "Image file is required")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ImageUploadQuery>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<CafeImage>>)> {
    let form = MultipartForm::read(multipart).await?;
    let resp = owner_service::upload_image(&state, &user, form.first_file(), query.cover).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/owner/images/{id}",
    params(("id" = i32, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image deleted"),
        (status = 404, description = "Image not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = owner_service::delete_image(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/owner/documents",
    responses((status = 200, description = "Cafe documents", body = ApiResponse<CafeDocumentList>)),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn list_documents(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CafeDocumentList>>> {
    let resp = owner_service::list_documents(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/owner/documents/{doc_key}",
    params(("doc_key" = String, Path, description = "Document slot, e.g. FSSAI")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document stored", body = ApiResponse<CafeDocument>),
        (status = 400, description = "File is required")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn upload_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(doc_key): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<CafeDocument>>> {
    let form = MultipartForm::read(multipart).await?;
    let resp = owner_service::upload_document(&state, &user, &doc_key, form.first_file()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/owner/documents/{id}/download",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document bytes"),
        (status = 404, description = "Document not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn download_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Download> {
    owner_service::download_document(&state, &user, id).await
}

#[utoipa::path(
    get,
    path = "/api/owner/menu",
    responses((status = 200, description = "Full menu", body = ApiResponse<MenuItemList>)),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn list_menu(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let resp = catalog_service::list_menu(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/owner/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created", body = ApiResponse<MenuItem>),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn create_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMenuItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MenuItem>>)> {
    let resp = catalog_service::create_menu_item(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/owner/menu/{id}",
    params(("id" = i32, Path, description = "Menu item ID")),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated", body = ApiResponse<MenuItem>),
        (status = 404, description = "Menu item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn update_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = catalog_service::update_menu_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/owner/menu/{id}",
    params(("id" = i32, Path, description = "Menu item ID")),
    responses(
        (status = 200, description = "Menu item deleted", body = ApiResponse<MenuItem>),
        (status = 404, description = "Menu item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = catalog_service::delete_menu_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/owner/menu/{id}/image",
    params(("id" = i32, Path, description = "Menu item ID")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Menu image replaced", body = ApiResponse<MenuItem>),
        (status = 404, description = "Menu item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn upload_menu_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let form = MultipartForm::read(multipart).await?;
    let resp = catalog_service::upload_menu_image(&state, &user, id, form.first_file()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/owner/capacities",
    responses((status = 200, description = "Function capacities", body = ApiResponse<CapacityList>)),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn list_capacities(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CapacityList>>> {
    let resp = catalog_service::list_capacities(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/owner/capacities",
    request_body = UpsertCapacityRequest,
    responses(
        (status = 200, description = "Capacity created or updated", body = ApiResponse<FunctionCapacity>),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn upsert_capacity(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpsertCapacityRequest>,
) -> AppResult<Json<ApiResponse<FunctionCapacity>>> {
    let resp = catalog_service::upsert_capacity(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/owner/capacities/{id}",
    params(("id" = i32, Path, description = "Capacity ID")),
    responses(
        (status = 200, description = "Capacity deleted", body = ApiResponse<FunctionCapacity>),
        (status = 404, description = "Function capacity not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn delete_capacity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<FunctionCapacity>>> {
    let resp = catalog_service::delete_capacity(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/owner/bookings",
    responses((status = 200, description = "Bookings of the cafe, newest first", body = ApiResponse<BookingList>)),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::list_bookings(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/owner/bookings/{id}/decision",
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = DecideBookingRequest,
    responses(
        (status = 200, description = "Booking accepted or denied", body = ApiResponse<Booking>),
        (status = 404, description = "Booking not found"),
        (status = 422, description = "Booking already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn decide_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<DecideBookingRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::decide_booking(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/owner/orders",
    responses((status = 200, description = "Orders of the cafe, newest first", body = ApiResponse<OrderList>)),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user).await?;
    Ok(Json(resp))
}
