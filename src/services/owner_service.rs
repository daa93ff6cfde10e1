use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::{
    audit,
    credentials::{generate_temp_password, hash_password},
    db::is_unique_violation,
    dto::{
        admin::TeardownReport,
        cafe::{CafeDocumentList, CafeImageList, CafeProfileRequest, StaffCreateRequest, StaffCreated, StaffList},
    },
    entity::{
        cafe_staff::{Column as StaffCol, Entity as CafeStaff},
        cafes::ActiveModel as CafeActive,
        sea_orm_active_enums::{ApprovalStatus, Role},
        users::{self, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    media::{Download, UploadedFile, release_all},
    middleware::auth::AuthUser,
    models::{Cafe, CafeDocument, CafeImage, StaffMember},
    notifier::notify_credentials,
    response::{ApiResponse, Meta},
    services::{
        cafe_media,
        identity::{
            NewAccount, create_account, delete_account_rows, ensure_contact_unique,
            ensure_username_free, non_blank, store_uploads, surviving_files, user_from_entity,
            username_base, validate_profile,
        },
        tenant::{
            apply_profile, cafe_from_entity, find_owned_cafe, require_owned_cafe, require_owner,
            teardown_cafe,
        },
    },
    state::AppState,
};

pub async fn get_cafe(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cafe>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(c) => c,
        None => return Err(AppError::not_found("Cafe not found")),
    };
    Ok(ApiResponse::success(
        "Cafe profile",
        cafe_from_entity(cafe, Some(owner.username)),
        Some(Meta::empty()),
    ))
}

/// Creates the owner's cafe on first call and overwrites present fields after.
/// New cafes wait for admin approval before they are public.
pub async fn upsert_cafe(
    state: &AppState,
    user: &AuthUser,
    payload: CafeProfileRequest,
) -> AppResult<ApiResponse<Cafe>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe_name = non_blank(payload.cafe_name.as_deref())
        .ok_or_else(|| AppError::validation("Cafe name is required"))?;

    let (cafe, created) = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(existing) => {
            let mut active: CafeActive = existing.into();
            apply_profile(&mut active, &payload);
            (active.update(&state.orm).await?, false)
        }
        None => {
            let now = Utc::now();
            let mut active = CafeActive {
                id: NotSet,
                owner_id: Set(owner.id),
                cafe_name: Set(cafe_name),
                active: Set(true),
                approval_status: Set(ApprovalStatus::Pending),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };
            apply_profile(&mut active, &payload);
            let inserted = match active.insert(&state.orm).await {
                Ok(c) => c,
                Err(err) if is_unique_violation(&err) => {
                    return Err(AppError::conflict("Owner already has a cafe"));
                }
                Err(err) => return Err(err.into()),
            };
            (inserted, true)
        }
    };

    if created {
        tracing::info!(cafe_id = cafe.id, owner_id = owner.id, "cafe created");
    }
    audit::record(
        state,
        Some(&owner.username),
        if created { "cafe_create" } else { "cafe_update" },
        "cafes",
        serde_json::json!({ "cafe_id": cafe.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Cafe saved",
        cafe_from_entity(cafe, Some(owner.username)),
        Some(Meta::empty()),
    ))
}

pub async fn delete_cafe(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<TeardownReport>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(c) => c,
        None => return Err(AppError::not_found("Cafe not found")),
    };
    let report = teardown_cafe(state, cafe).await?;

    audit::record(
        state,
        Some(&owner.username),
        "cafe_delete",
        "cafes",
        serde_json::json!({ "cafe_id": report.cafe_id, "orphaned_media": report.orphaned_media }),
    )
    .await;

    Ok(ApiResponse::success("Cafe deleted", report, Some(Meta::empty())))
}

pub async fn list_staff(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<StaffList>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(c) => c,
        None => return Err(AppError::not_found("Cafe not found")),
    };

    let items = Users::find()
        .inner_join(CafeStaff)
        .filter(StaffCol::CafeId.eq(cafe.id))
        .order_by_asc(UserCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(staff_from_entity)
        .collect();

    Ok(ApiResponse::success("Staff", StaffList { items }, Some(Meta::empty())))
}

/// The staff user and its roster entry are written together.
pub async fn create_staff(
    state: &AppState,
    user: &AuthUser,
    payload: StaffCreateRequest,
    documents: Vec<UploadedFile>,
) -> AppResult<ApiResponse<StaffCreated>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = require_owned_cafe(&state.orm, owner.id).await?;

    let role = match payload.role.parse::<Role>() {
        Ok(role) if role.is_staff() => role,
        _ => return Err(AppError::validation("Invalid role")),
    };
    let profile = validate_profile(payload.personal_details.as_ref(), payload.address.as_ref())?;

    ensure_contact_unique(&state.orm, &profile.email, &profile.phone).await?;

    let username = match non_blank(payload.username.as_deref()) {
        Some(username) => username,
        None => format!(
            "{}_{}",
            username_base(Some(&profile.email)),
            role.as_str().to_lowercase()
        ),
    };
    ensure_username_free(&state.orm, &username).await?;

    let chosen_password = payload.password.filter(|p| !p.trim().is_empty());
    let generated = chosen_password.is_none();
    let raw_password = chosen_password.unwrap_or_else(generate_temp_password);
    let password_hash = hash_password(&raw_password)?;

    let stored = store_uploads(state.media.as_ref(), surviving_files(documents)).await?;
    let staff = create_account(
        state,
        NewAccount {
            username,
            password_hash,
            role,
            approval_status: ApprovalStatus::Approved,
            force_password_change: generated,
            profile,
            academic_records: payload.academic_records.unwrap_or_default(),
            work_records: payload.work_records.unwrap_or_default(),
            documents: stored,
            roster_cafe_id: Some(cafe.id),
        },
    )
    .await?;

    tracing::info!(cafe_id = cafe.id, user_id = staff.id, role = %role, "staff created");
    audit::record(
        state,
        Some(&owner.username),
        "staff_create",
        "users",
        serde_json::json!({ "cafe_id": cafe.id, "user_id": staff.id, "role": role.as_str() }),
    )
    .await;

    if generated {
        notify_credentials(
            state.notifier.as_ref(),
            staff.email.as_deref(),
            &staff.username,
            &raw_password,
        )
        .await;
    }

    Ok(ApiResponse::success(
        "Staff created",
        StaffCreated {
            user: user_from_entity(staff),
            temp_password: generated.then_some(raw_password),
        },
        Some(Meta::empty()),
    ))
}

/// Staff on another cafe's roster read as missing.
pub async fn delete_staff(
    state: &AppState,
    user: &AuthUser,
    staff_id: i32,
) -> AppResult<ApiResponse<StaffMember>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = require_owned_cafe(&state.orm, owner.id).await?;

    let target = match Users::find_by_id(staff_id).one(&state.orm).await? {
        Some(u) => u,
        None => return Err(AppError::not_found("Staff member not found")),
    };
    let on_roster = CafeStaff::find_by_id(target.id)
        .filter(StaffCol::CafeId.eq(cafe.id))
        .one(&state.orm)
        .await?
        .is_some();
    if !on_roster {
        return Err(AppError::not_found("Staff member not found"));
    }
    if !target.role.is_staff() {
        return Err(AppError::state("User is not staff"));
    }

    let txn = state.orm.begin().await?;
    let document_keys = delete_account_rows(&txn, target.id).await?;
    txn.commit().await?;
    release_all(state.media.as_ref(), document_keys).await;

    tracing::info!(cafe_id = cafe.id, user_id = target.id, "staff deleted");
    audit::record(
        state,
        Some(&owner.username),
        "staff_delete",
        "users",
        serde_json::json!({ "cafe_id": cafe.id, "user_id": target.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Staff deleted",
        staff_from_entity(target),
        Some(Meta::empty()),
    ))
}

pub async fn list_images(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CafeImageList>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(c) => c,
        None => return Err(AppError::not_found("Cafe not found")),
    };
    let items = cafe_media::list_images(&state.orm, cafe.id).await?;
    Ok(ApiResponse::success("Cafe images", CafeImageList { items }, Some(Meta::empty())))
}

pub async fn upload_image(
    state: &AppState,
    user: &AuthUser,
    file: Option<UploadedFile>,
    cover: bool,
) -> AppResult<ApiResponse<CafeImage>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = require_owned_cafe(&state.orm, owner.id).await?;
    let image = cafe_media::upload_image(state, cafe.id, file, cover).await?;
    Ok(ApiResponse::success("Image uploaded", image, Some(Meta::empty())))
}

pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    image_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = require_owned_cafe(&state.orm, owner.id).await?;
    cafe_media::delete_image(state, cafe.id, image_id).await?;
    Ok(ApiResponse::success(
        "Image deleted",
        serde_json::json!({ "id": image_id }),
        Some(Meta::empty()),
    ))
}

pub async fn list_documents(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CafeDocumentList>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(c) => c,
        None => return Err(AppError::not_found("Cafe not found")),
    };
    let items = cafe_media::list_documents(&state.orm, cafe.id).await?;
    Ok(ApiResponse::success(
        "Cafe documents",
        CafeDocumentList { items },
        Some(Meta::empty()),
    ))
}

pub async fn upload_document(
    state: &AppState,
    user: &AuthUser,
    doc_key: &str,
    file: Option<UploadedFile>,
) -> AppResult<ApiResponse<CafeDocument>> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = require_owned_cafe(&state.orm, owner.id).await?;
    let doc = cafe_media::upsert_document(state, cafe.id, doc_key, file).await?;
    Ok(ApiResponse::success("Document saved", doc, Some(Meta::empty())))
}

pub async fn download_document(state: &AppState, user: &AuthUser, doc_id: i32) -> AppResult<Download> {
    let owner = require_owner(&state.orm, &user.username).await?;
    let cafe = match find_owned_cafe(&state.orm, owner.id).await? {
        Some(c) => c,
        None => return Err(AppError::not_found("Document not found")),
    };
    cafe_media::download_document(state, cafe.id, doc_id).await
}

pub fn staff_from_entity(model: users::Model) -> StaffMember {
    StaffMember {
        id: model.id,
        username: model.username,
        role: model.role,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        force_password_change: model.force_password_change,
    }
}
