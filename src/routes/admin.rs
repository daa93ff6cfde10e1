use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::{
    dto::{
        admin::{
            ApprovalResponse, CafeList, CreateOwnerRequest, CreateOwnerResponse, DenyRequest,
            OwnerList, TeardownReport, UserList, UserListQuery,
        },
        cafe::{AdminCreateCafeRequest, CafeApprovalRequest, CafeDocumentList},
        catalog::MenuItemList,
    },
    error::AppResult,
    media::Download,
    middleware::auth::AuthUser,
    models::{Cafe, User, UserDetail},
    response::ApiResponse,
    routes::{MultipartForm, params::Pagination},
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/users/{id}/approve", post(approve_user))
        .route("/users/{id}/deny", post(deny_user))
        .route("/users/{id}/documents/{doc_id}", get(download_user_document))
        .route("/owners", get(list_owners).post(create_owner))
        .route("/cafes", get(list_cafes).post(create_cafe))
        .route("/cafes/{id}", get(get_cafe))
        .route("/cafes/{id}", delete(delete_cafe))
        .route("/cafes/{id}/approval", put(set_cafe_approval))
        .route("/cafes/{id}/menu", get(cafe_menu))
        .route("/cafes/{id}/documents", get(list_cafe_documents))
        .route("/cafes/{id}/documents/{doc_id}", get(download_cafe_document))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("status" = Option<String>, Query, description = "Filter by approval status")
    ),
    responses(
        (status = 200, description = "List users with document metadata", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User detail", body = ApiResponse<UserDetail>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<UserDetail>>> {
    let resp = admin_service::get_user(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<User>),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Admin or owner with a cafe")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::delete_user(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/approve",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User approved with a one-time password", body = ApiResponse<ApprovalResponse>),
        (status = 404, description = "Not Found"),
        (status = 422, description = "User is not pending approval")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn approve_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ApprovalResponse>>> {
    let resp = admin_service::approve_user(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/deny",
    params(("id" = i32, Path, description = "User ID")),
    request_body = DenyRequest,
    responses(
        (status = 200, description = "User denied", body = ApiResponse<User>),
        (status = 404, description = "Not Found"),
        (status = 422, description = "User is not pending approval")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn deny_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    payload: Option<Json<DenyRequest>>,
) -> AppResult<Json<ApiResponse<User>>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let resp = admin_service::deny_user(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}/documents/{doc_id}",
    params(
        ("id" = i32, Path, description = "User ID"),
        ("doc_id" = i32, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document bytes"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn download_user_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, doc_id)): Path<(i32, i32)>,
) -> AppResult<Download> {
    admin_service::download_user_document(&state, &user, id, doc_id).await
}

#[utoipa::path(
    get,
    path = "/api/admin/owners",
    responses(
        (status = 200, description = "List owners", body = ApiResponse<OwnerList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_owners(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OwnerList>>> {
    let resp = admin_service::list_owners(&state, &user).await?;
    Ok(Json(resp))
}

/// Multipart: a `data` part with the owner JSON plus one or more document files.
#[utoipa::path(
    post,
    path = "/api/admin/owners",
    request_body(content = CreateOwnerRequest, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Owner created", body = ApiResponse<CreateOwnerResponse>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email, phone or username already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_owner(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<CreateOwnerResponse>>)> {
    let form = MultipartForm::read(multipart).await?;
    let payload: CreateOwnerRequest = form.payload()?;
    let resp = admin_service::create_owner(&state, &user, payload, form.files).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/admin/cafes",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List cafes", body = ApiResponse<CafeList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_cafes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CafeList>>> {
    let resp = admin_service::list_cafes(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/cafes",
    request_body = AdminCreateCafeRequest,
    responses(
        (status = 201, description = "Cafe created for an owner", body = ApiResponse<Cafe>),
        (status = 400, description = "Owner not found or name missing"),
        (status = 409, description = "Owner already has a cafe")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_cafe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AdminCreateCafeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Cafe>>)> {
    let resp = admin_service::create_cafe_for_owner(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/admin/cafes/{id}",
    params(("id" = i32, Path, description = "Cafe ID")),
    responses(
        (status = 200, description = "Cafe detail", body = ApiResponse<Cafe>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_cafe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Cafe>>> {
    let resp = admin_service::get_cafe(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/cafes/{id}",
    params(("id" = i32, Path, description = "Cafe ID")),
    responses(
        (status = 200, description = "Cafe and everything it owns removed", body = ApiResponse<TeardownReport>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_cafe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<TeardownReport>>> {
    let resp = admin_service::delete_cafe(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/cafes/{id}/approval",
    params(("id" = i32, Path, description = "Cafe ID")),
    request_body = CafeApprovalRequest,
    responses(
        (status = 200, description = "Cafe approval updated", body = ApiResponse<Cafe>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_cafe_approval(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CafeApprovalRequest>,
) -> AppResult<Json<ApiResponse<Cafe>>> {
    let resp = admin_service::set_cafe_approval(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/cafes/{id}/menu",
    params(("id" = i32, Path, description = "Cafe ID")),
    responses(
        (status = 200, description = "Full menu of a cafe", body = ApiResponse<MenuItemList>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn cafe_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let resp = admin_service::cafe_menu(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/cafes/{id}/documents",
    params(("id" = i32, Path, description = "Cafe ID")),
    responses(
        (status = 200, description = "Cafe documents", body = ApiResponse<CafeDocumentList>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_cafe_documents(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<CafeDocumentList>>> {
    let resp = admin_service::list_cafe_documents(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/cafes/{id}/documents/{doc_id}",
    params(
        ("id" = i32, Path, description = "Cafe ID"),
        ("doc_id" = i32, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document bytes"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn download_cafe_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, doc_id)): Path<(i32, i32)>,
) -> AppResult<Download> {
    admin_service::download_cafe_document(&state, &user, id, doc_id).await
}
