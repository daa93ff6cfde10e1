use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use std::collections::{HashMap, HashSet};

use crate::{
    audit,
    credentials::{generate_temp_password, hash_password},
    db::is_unique_violation,
    dto::{
        admin::{
            ApprovalResponse, CafeList, CreateOwnerRequest, CreateOwnerResponse, DenyRequest,
            OwnerList, TeardownReport, UserList, UserListQuery,
        },
        cafe::{AdminCreateCafeRequest, CafeApprovalRequest, CafeDocumentList},
        catalog::MenuItemList,
    },
    entity::{
        academic_records::{Column as AcademicCol, Entity as AcademicRecords},
        cafes::{self, ActiveModel as CafeActive, Column as CafeCol, Entity as Cafes},
        documents::{Column as DocumentCol, Entity as Documents},
        sea_orm_active_enums::{ApprovalStatus, Role},
        users::{Column as UserCol, Entity as Users, Model as UserModel},
        work_records::{Column as WorkCol, Entity as WorkRecords},
    },
    error::{AppError, AppResult},
    media::{Download, UploadedFile, release_all},
    middleware::auth::AuthUser,
    models::{AcademicRecord, Address, Cafe, Owner, UserDetail, UserWithDocuments, WorkRecord},
    notifier::{notify_credentials, notify_denied},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{
        cafe_media,
        catalog_service::menu_for_cafe,
        identity::{
            NewAccount, create_account, delete_account_rows, document_from_entity,
            ensure_contact_unique, ensure_username_free, find_user_by_username, non_blank,
            require_actor, store_uploads, surviving_files, user_from_entity, username_base,
            validate_profile,
        },
        tenant::{apply_profile, cafe_from_entity, find_owned_cafe, teardown_cafe},
    },
    state::AppState,
};

async fn require_admin(state: &AppState, user: &AuthUser) -> AppResult<UserModel> {
    require_actor(&state.orm, &user.username, &[Role::Admin]).await
}

async fn find_user(state: &AppState, id: i32) -> AppResult<UserModel> {
    match Users::find_by_id(id).one(&state.orm).await? {
        Some(u) => Ok(u),
        None => Err(AppError::not_found("User not found")),
    }
}

async fn find_cafe(state: &AppState, id: i32) -> AppResult<cafes::Model> {
    match Cafes::find_by_id(id).one(&state.orm).await? {
        Some(c) => Ok(c),
        None => Err(AppError::not_found("Cafe not found")),
    }
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    require_admin(state, user).await?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(role) = non_blank(query.role.as_deref()) {
        let role: Role = role.parse().map_err(|_| AppError::validation("Invalid role"))?;
        condition = condition.add(UserCol::Role.eq(role));
    }
    if let Some(status) = non_blank(query.status.as_deref()) {
        let status = parse_status(&status)?;
        condition = condition.add(UserCol::ApprovalStatus.eq(status));
    }

    let finder = Users::find().filter(condition).order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let users = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
    let mut docs_by_user: HashMap<i32, Vec<_>> = HashMap::new();
    if !ids.is_empty() {
        for doc in Documents::find()
            .filter(DocumentCol::UserId.is_in(ids))
            .order_by_asc(DocumentCol::Id)
            .all(&state.orm)
            .await?
        {
            docs_by_user
                .entry(doc.user_id)
                .or_default()
                .push(document_from_entity(doc));
        }
    }

    let items = users
        .into_iter()
        .map(|u| UserWithDocuments {
            documents: docs_by_user.remove(&u.id).unwrap_or_default(),
            user: user_from_entity(u),
        })
        .collect();

    let meta = Meta::paged(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

fn parse_status(token: &str) -> AppResult<ApprovalStatus> {
    match token {
        "PENDING" => Ok(ApprovalStatus::Pending),
        "APPROVED" => Ok(ApprovalStatus::Approved),
        "DENIED" => Ok(ApprovalStatus::Denied),
        _ => Err(AppError::validation("Invalid status")),
    }
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<UserDetail>> {
    require_admin(state, user).await?;
    let target = find_user(state, id).await?;

    let academic_records = AcademicRecords::find()
        .filter(AcademicCol::UserId.eq(target.id))
        .order_by_asc(AcademicCol::Position)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|r| AcademicRecord {
            institution_name: r.institution_name,
            degree: r.degree,
            passing_year: r.passing_year,
            grade: r.grade,
            grade_in_percentage: r.grade_in_percentage,
        })
        .collect();

    let work_records = WorkRecords::find()
        .filter(WorkCol::UserId.eq(target.id))
        .order_by_asc(WorkCol::Position)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|r| WorkRecord {
            start_date: r.start_date,
            end_date: r.end_date,
            currently_working: r.currently_working,
            company_name: r.company_name,
            designation: r.designation,
            ctc: r.ctc,
            reason_for_leaving: r.reason_for_leaving,
        })
        .collect();

    let documents = Documents::find()
        .filter(DocumentCol::UserId.eq(target.id))
        .order_by_asc(DocumentCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(document_from_entity)
        .collect();

    let detail = UserDetail {
        gender: target.gender.clone(),
        marital_status: target.marital_status.clone(),
        address: Address {
            street: target.street.clone(),
            city: target.city.clone(),
            state: target.state.clone(),
            pincode: target.pincode.clone(),
        },
        user: user_from_entity(target),
        academic_records,
        work_records,
        documents,
    };

    Ok(ApiResponse::success("User found", detail, Some(Meta::empty())))
}

pub async fn download_user_document(
    state: &AppState,
    user: &AuthUser,
    user_id: i32,
    doc_id: i32,
) -> AppResult<Download> {
    require_admin(state, user).await?;
    let doc = Documents::find_by_id(doc_id)
        .filter(DocumentCol::UserId.eq(user_id))
        .one(&state.orm)
        .await?;
    let doc = match doc {
        Some(d) => d,
        None => return Err(AppError::not_found("Document not found")),
    };
    let bytes = cafe_media::fetch(state.media.as_ref(), &doc.storage_key).await?;
    Ok(Download {
        filename: doc.document_name.unwrap_or_else(|| format!("document-{}", doc.id)),
        content_type: doc
            .document_type
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        bytes,
    })
}

/// PENDING -> APPROVED with a fresh one-time password. The write only lands while
/// the user is still pending, so concurrent decisions yield exactly one winner.
pub async fn approve_user(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<ApprovalResponse>> {
    let admin = require_admin(state, user).await?;
    let target = find_user(state, id).await?;
    if target.approval_status != Some(ApprovalStatus::Pending) {
        return Err(AppError::state("User is not pending approval"));
    }

    let temp_password = generate_temp_password();
    let password_hash = hash_password(&temp_password)?;
    let claimed = Users::update_many()
        .col_expr(UserCol::PasswordHash, Expr::value(password_hash))
        .col_expr(UserCol::ForcePasswordChange, Expr::value(true))
        .col_expr(UserCol::ApprovalStatus, Expr::value(ApprovalStatus::Approved))
        .filter(UserCol::Id.eq(target.id))
        .filter(UserCol::ApprovalStatus.eq(ApprovalStatus::Pending))
        .exec(&state.orm)
        .await?
        .rows_affected;
    // another decision landed between the read and the write
    if claimed == 0 {
        return Err(AppError::state("User is not pending approval"));
    }
    let approved = find_user(state, target.id).await?;

    tracing::info!(user_id = approved.id, username = %approved.username, "user approved");
    notify_credentials(
        state.notifier.as_ref(),
        approved.email.as_deref(),
        &approved.username,
        &temp_password,
    )
    .await;
    audit::record(
        state,
        Some(&admin.username),
        "user_approve",
        "users",
        serde_json::json!({ "user_id": approved.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User approved",
        ApprovalResponse {
            user: user_from_entity(approved),
            temp_password,
        },
        Some(Meta::empty()),
    ))
}

/// PENDING -> DENIED. There is no way back to PENDING.
pub async fn deny_user(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: DenyRequest,
) -> AppResult<ApiResponse<crate::models::User>> {
    let admin = require_admin(state, user).await?;
    let target = find_user(state, id).await?;
    if target.approval_status != Some(ApprovalStatus::Pending) {
        return Err(AppError::state("User is not pending approval"));
    }

    let reason = non_blank(payload.reason.as_deref());
    let claimed = Users::update_many()
        .col_expr(UserCol::ApprovalStatus, Expr::value(ApprovalStatus::Denied))
        .filter(UserCol::Id.eq(target.id))
        .filter(UserCol::ApprovalStatus.eq(ApprovalStatus::Pending))
        .exec(&state.orm)
        .await?
        .rows_affected;
    if claimed == 0 {
        return Err(AppError::state("User is not pending approval"));
    }
    let denied = find_user(state, target.id).await?;

    tracing::info!(user_id = denied.id, username = %denied.username, "user denied");
    notify_denied(
        state.notifier.as_ref(),
        denied.email.as_deref(),
        reason.as_deref(),
    )
    .await;
    audit::record(
        state,
        Some(&admin.username),
        "user_deny",
        "users",
        serde_json::json!({ "user_id": denied.id, "reason": reason }),
    )
    .await;

    Ok(ApiResponse::success(
        "User denied",
        user_from_entity(denied),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<crate::models::User>> {
    let admin = require_admin(state, user).await?;
    let target = find_user(state, id).await?;
    if target.role == Role::Admin {
        return Err(AppError::state("Cannot delete admin user"));
    }
    if find_owned_cafe(&state.orm, target.id).await?.is_some() {
        return Err(AppError::state("Cannot delete owner with a cafe"));
    }

    let txn = state.orm.begin().await?;
    let document_keys = delete_account_rows(&txn, target.id).await?;
    txn.commit().await?;
    let orphans = release_all(state.media.as_ref(), document_keys).await;

    tracing::info!(user_id = target.id, username = %target.username, orphans = orphans.len(), "user deleted");
    audit::record(
        state,
        Some(&admin.username),
        "user_delete",
        "users",
        serde_json::json!({ "user_id": target.id, "username": target.username }),
    )
    .await;

    Ok(ApiResponse::success(
        "User deleted",
        user_from_entity(target),
        Some(Meta::empty()),
    ))
}

pub async fn list_owners(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OwnerList>> {
    require_admin(state, user).await?;
    let owners = Users::find()
        .filter(UserCol::Role.eq(Role::Owner))
        .order_by_asc(UserCol::Id)
        .all(&state.orm)
        .await?;

    let with_cafe: HashSet<i32> = Cafes::find()
        .select_only()
        .column(CafeCol::OwnerId)
        .into_tuple::<i32>()
        .all(&state.orm)
        .await?
        .into_iter()
        .collect();

    let items = owners
        .into_iter()
        .map(|o| Owner {
            has_cafe: with_cafe.contains(&o.id),
            id: o.id,
            username: o.username,
            first_name: o.first_name,
            last_name: o.last_name,
            email: o.email,
            phone: o.phone,
            approval_status: o.approval_status,
        })
        .collect();

    Ok(ApiResponse::success("Owners", OwnerList { items }, Some(Meta::empty())))
}

/// Onboards an owner directly: approved at once, documents required, credentials
/// generated and mailed.
pub async fn create_owner(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOwnerRequest,
    documents: Vec<UploadedFile>,
) -> AppResult<ApiResponse<CreateOwnerResponse>> {
    let admin = require_admin(state, user).await?;

    if let Some(role) = non_blank(payload.role.as_deref()) {
        if !matches!(role.parse::<Role>(), Ok(Role::Owner)) {
            return Err(AppError::validation("Invalid role"));
        }
    }
    let profile = validate_profile(payload.personal_details.as_ref(), payload.address.as_ref())?;
    let documents = surviving_files(documents);
    if documents.is_empty() {
        return Err(AppError::validation("Documents are required"));
    }

    ensure_contact_unique(&state.orm, &profile.email, &profile.phone).await?;
    let username = non_blank(payload.username.as_deref())
        .unwrap_or_else(|| format!("{}_owner", username_base(Some(&profile.email))));
    ensure_username_free(&state.orm, &username).await?;

    let temp_password = generate_temp_password();
    let password_hash = hash_password(&temp_password)?;

    let stored = store_uploads(state.media.as_ref(), documents).await?;
    let owner = create_account(
        state,
        NewAccount {
            username,
            password_hash,
            role: Role::Owner,
            approval_status: ApprovalStatus::Approved,
            force_password_change: true,
            profile,
            academic_records: Vec::new(),
            work_records: Vec::new(),
            documents: stored,
            roster_cafe_id: None,
        },
    )
    .await?;

    tracing::info!(user_id = owner.id, username = %owner.username, "owner created by admin");
    notify_credentials(
        state.notifier.as_ref(),
        owner.email.as_deref(),
        &owner.username,
        &temp_password,
    )
    .await;
    audit::record(
        state,
        Some(&admin.username),
        "owner_create",
        "users",
        serde_json::json!({ "user_id": owner.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Owner created",
        CreateOwnerResponse {
            user: user_from_entity(owner),
            temp_password,
        },
        Some(Meta::empty()),
    ))
}

pub async fn create_cafe_for_owner(
    state: &AppState,
    user: &AuthUser,
    payload: AdminCreateCafeRequest,
) -> AppResult<ApiResponse<Cafe>> {
    let admin = require_admin(state, user).await?;

    let owner = match non_blank(payload.owner_username.as_deref()) {
        Some(username) => find_user_by_username(&state.orm, &username).await?,
        None => None,
    };
    let owner = match owner {
        Some(o) if o.role == Role::Owner => o,
        _ => return Err(AppError::validation("Owner not found")),
    };
    let cafe_name = non_blank(payload.profile.cafe_name.as_deref())
        .ok_or_else(|| AppError::validation("Cafe name is required"))?;

    if find_owned_cafe(&state.orm, owner.id).await?.is_some() {
        return Err(AppError::conflict("Owner already has a cafe"));
    }

    let now = Utc::now();
    let mut active = CafeActive {
        id: NotSet,
        owner_id: Set(owner.id),
        cafe_name: Set(cafe_name),
        active: Set(true),
        approval_status: Set(ApprovalStatus::Approved),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };
    apply_profile(&mut active, &payload.profile);
    let cafe = match active.insert(&state.orm).await {
        Ok(c) => c,
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::conflict("Owner already has a cafe"));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(cafe_id = cafe.id, owner_id = owner.id, "cafe created by admin");
    audit::record(
        state,
        Some(&admin.username),
        "cafe_create",
        "cafes",
        serde_json::json!({ "cafe_id": cafe.id, "owner_id": owner.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Cafe created",
        cafe_from_entity(cafe, Some(owner.username)),
        Some(Meta::empty()),
    ))
}

pub async fn list_cafes(
    state: &AppState,
    user: &AuthUser,
    query: Pagination,
) -> AppResult<ApiResponse<CafeList>> {
    require_admin(state, user).await?;
    let (page, limit, offset) = query.normalize();

    let finder = Cafes::find().order_by_asc(CafeCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;
    let rows = finder
        .find_also_related(Users)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .map(|(cafe, owner)| cafe_from_entity(cafe, owner.map(|o| o.username)))
        .collect();

    Ok(ApiResponse::success(
        "Cafes",
        CafeList { items },
        Some(Meta::paged(page, limit, total)),
    ))
}

pub async fn get_cafe(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<Cafe>> {
    require_admin(state, user).await?;
    let cafe = find_cafe(state, id).await?;
    let owner = Users::find_by_id(cafe.owner_id).one(&state.orm).await?;
    Ok(ApiResponse::success(
        "Cafe found",
        cafe_from_entity(cafe, owner.map(|o| o.username)),
        Some(Meta::empty()),
    ))
}

/// Cafe approval is independent of the owner's account approval.
pub async fn set_cafe_approval(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: CafeApprovalRequest,
) -> AppResult<ApiResponse<Cafe>> {
    let admin = require_admin(state, user).await?;
    let cafe = find_cafe(state, id).await?;

    let mut active: CafeActive = cafe.into();
    active.approval_status = Set(payload.status);
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    active.updated_at = Set(Utc::now().into());
    let cafe = active.update(&state.orm).await?;

    tracing::info!(cafe_id = cafe.id, status = ?cafe.approval_status, active = cafe.active, "cafe status changed");
    audit::record(
        state,
        Some(&admin.username),
        "cafe_approval",
        "cafes",
        serde_json::json!({ "cafe_id": cafe.id, "active": cafe.active }),
    )
    .await;

    let owner = Users::find_by_id(cafe.owner_id).one(&state.orm).await?;
    Ok(ApiResponse::success(
        "Cafe updated",
        cafe_from_entity(cafe, owner.map(|o| o.username)),
        Some(Meta::empty()),
    ))
}

pub async fn cafe_menu(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<MenuItemList>> {
    require_admin(state, user).await?;
    let cafe = find_cafe(state, id).await?;
    let items = menu_for_cafe(&state.orm, cafe.id, false).await?;
    Ok(ApiResponse::success("Menu items", MenuItemList { items }, Some(Meta::empty())))
}

pub async fn delete_cafe(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<TeardownReport>> {
    let admin = require_admin(state, user).await?;
    let cafe = find_cafe(state, id).await?;
    let report = teardown_cafe(state, cafe).await?;

    audit::record(
        state,
        Some(&admin.username),
        "cafe_delete",
        "cafes",
        serde_json::json!({ "cafe_id": report.cafe_id, "orphaned_media": report.orphaned_media }),
    )
    .await;

    Ok(ApiResponse::success("Cafe deleted", report, Some(Meta::empty())))
}

pub async fn list_cafe_documents(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<CafeDocumentList>> {
    require_admin(state, user).await?;
    let cafe = find_cafe(state, id).await?;
    let items = cafe_media::list_documents(&state.orm, cafe.id).await?;
    Ok(ApiResponse::success(
        "Cafe documents",
        CafeDocumentList { items },
        Some(Meta::empty()),
    ))
}

pub async fn download_cafe_document(
    state: &AppState,
    user: &AuthUser,
    cafe_id: i32,
    doc_id: i32,
) -> AppResult<Download> {
    require_admin(state, user).await?;
    let cafe = find_cafe(state, cafe_id).await?;
    cafe_media::download_document(state, cafe.id, doc_id).await
}
