use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};

use crate::{
    dto::auth::{ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    error::AppResult,
    models::User,
    response::ApiResponse,
    routes::MultipartForm,
    services::auth_service::{change_password, login_user, register_user},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/change-password", post(update_password))
}

/// Multipart: a `data` part holding the JSON registration and any number of file parts.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body(content = RegisterRequest, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Register user", body = ApiResponse<RegisterResponse>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email, phone or username already exists")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<RegisterResponse>>)> {
    let form = MultipartForm::read(multipart).await?;
    let payload: RegisterRequest = form.payload()?;
    let resp = register_user(&state, payload, form.files).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials, pending or denied account")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<User>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn update_password(
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = change_password(&state, payload).await?;
    Ok(Json(resp))
}
