use sea_orm::{ActiveModelTrait, Set};

use crate::{
    audit,
    credentials::{generate_temp_password, hash_password, issue_token, verify_password},
    dto::auth::{ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    entity::{
        sea_orm_active_enums::{ApprovalStatus, Role},
        users::ActiveModel as UserActive,
    },
    error::{AppError, AppResult},
    media::UploadedFile,
    models::User,
    notifier::notify_credentials,
    response::{ApiResponse, Meta},
    services::identity::{
        NewAccount, create_account, ensure_contact_unique, ensure_username_free,
        find_user_by_username, generate_username, non_blank, store_uploads, surviving_files,
        user_from_entity, validate_profile,
    },
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 4;

/// Self-registration. Checks run in a fixed order and stop at the first failure:
/// role and registration key, profile fields, documents, then email, phone and
/// username uniqueness.
pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
    documents: Vec<UploadedFile>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let role: Role = payload
        .role
        .parse()
        .map_err(|_| AppError::validation("Invalid role"))?;

    let privileged = role.is_privileged();
    if privileged && !registration_key_matches(state, payload.registration_key.as_deref()) {
        // Same reason as an unknown role, so privileged roles are not advertised.
        return Err(AppError::validation("Invalid role"));
    }

    let profile = validate_profile(payload.personal_details.as_ref(), payload.address.as_ref())?;
    let Some(academic_records) = payload.academic_records else {
        return Err(AppError::validation("Academic records are required"));
    };
    let Some(work_records) = payload.work_records else {
        return Err(AppError::validation("Work records are required"));
    };

    let documents = surviving_files(documents);
    if payload.documents_required && documents.is_empty() {
        return Err(AppError::validation("Documents are required"));
    }

    ensure_contact_unique(&state.orm, &profile.email, &profile.phone).await?;

    let chosen_username = non_blank(payload.username.as_deref()).filter(|_| privileged);
    let username = match chosen_username {
        Some(username) => {
            ensure_username_free(&state.orm, &username).await?;
            username
        }
        None => generate_username(&state.orm, Some(&profile.email)).await?,
    };

    let chosen_password = payload
        .password
        .filter(|p| privileged && !p.trim().is_empty());
    let generated = chosen_password.is_none();
    let raw_password = chosen_password.unwrap_or_else(generate_temp_password);
    let password_hash = hash_password(&raw_password)?;

    let approval_status = if privileged {
        ApprovalStatus::Approved
    } else {
        ApprovalStatus::Pending
    };

    let stored = store_uploads(state.media.as_ref(), documents).await?;
    let document_count = stored.len();
    let user = create_account(
        state,
        NewAccount {
            username,
            password_hash,
            role,
            approval_status,
            force_password_change: generated,
            profile,
            academic_records,
            work_records,
            documents: stored,
            roster_cafe_id: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "user registered");
    audit::record(
        state,
        Some(&user.username),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role.as_str(), "documents": document_count }),
    )
    .await;

    // Pending accounts get fresh credentials on approval; self-activating ones need them now.
    if privileged && generated {
        notify_credentials(
            state.notifier.as_ref(),
            user.email.as_deref(),
            &user.username,
            &raw_password,
        )
        .await;
    }

    Ok(ApiResponse::success(
        "Registration successful",
        RegisterResponse {
            user: user_from_entity(user),
        },
        Some(Meta::empty()),
    ))
}

fn registration_key_matches(state: &AppState, supplied: Option<&str>) -> bool {
    match (state.config.admin_registration_key.as_deref(), supplied) {
        (Some(expected), Some(supplied)) => !expected.trim().is_empty() && expected == supplied,
        _ => false,
    }
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;
    let user = match find_user_by_username(&state.orm, &username).await? {
        Some(u) => u,
        None => return Err(AppError::unauthorized("Invalid credentials")),
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let user = if user.role == Role::Admin {
        if user.approval_status.is_none() {
            tracing::info!(user_id = user.id, "admin approval status healed");
            let mut active: UserActive = user.into();
            active.approval_status = Set(Some(ApprovalStatus::Approved));
            active.update(&state.orm).await?
        } else {
            user
        }
    } else {
        match user.approval_status {
            Some(ApprovalStatus::Approved) => user,
            Some(ApprovalStatus::Denied) => {
                return Err(AppError::unauthorized("Account denied by admin"));
            }
            _ => return Err(AppError::unauthorized("Account pending admin approval")),
        }
    };

    let token = issue_token(
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
        &user.username,
        user.role,
    )?;

    audit::record(
        state,
        Some(&user.username),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        username: user.username,
        role: user.role,
        force_password_change: user.force_password_change,
    };

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn change_password(
    state: &AppState,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<User>> {
    let username = non_blank(payload.username.as_deref())
        .ok_or_else(|| AppError::validation("Username required"))?;
    let old_password = present(payload.old_password)
        .ok_or_else(|| AppError::validation("Old password required"))?;
    let new_password = present(payload.new_password)
        .ok_or_else(|| AppError::validation("New password required"))?;
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("Password too short"));
    }

    let user = match find_user_by_username(&state.orm, &username).await? {
        Some(u) => u,
        None => return Err(AppError::unauthorized("Invalid credentials")),
    };
    if !verify_password(&old_password, &user.password_hash)? {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let mut active: UserActive = user.into();
    active.password_hash = Set(hash_password(&new_password)?);
    active.force_password_change = Set(false);
    let user = active.update(&state.orm).await?;

    audit::record(
        state,
        Some(&user.username),
        "password_change",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Password changed",
        user_from_entity(user),
        Some(Meta::empty()),
    ))
}

/// Passwords are kept verbatim; only all-blank values count as missing.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
