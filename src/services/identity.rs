//! Account records shared by registration, staff creation and admin onboarding:
//! profile validation, the ordered uniqueness checks, username generation and the
//! transactional insert of a user with its history and documents.

use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    db::is_unique_violation,
    dto::auth::PersonalDetails,
    entity::{
        academic_records::{
            ActiveModel as AcademicActive, Column as AcademicCol, Entity as AcademicRecords,
        },
        cafe_staff::ActiveModel as StaffActive,
        documents::{
            ActiveModel as DocumentActive, Column as DocumentCol, Entity as Documents,
            Model as DocumentModel,
        },
        sea_orm_active_enums::{ApprovalStatus, Role},
        users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users},
        work_records::{ActiveModel as WorkActive, Column as WorkCol, Entity as WorkRecords},
    },
    error::{AppError, AppResult},
    media::{MediaStore, UploadedFile, release_all},
    models::{AcademicRecord, Address, Document, User, WorkRecord},
    services::tenant::remove_from_all_rosters,
    state::AppState,
};

const USERNAME_RANDOM_ATTEMPTS: usize = 25;

pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(value: Option<&str>, message: &str) -> AppResult<String> {
    non_blank(value).ok_or_else(|| AppError::validation(message))
}

/// Profile fields after the required-field checks.
#[derive(Debug, Clone)]
pub struct ValidProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

pub fn validate_profile(
    personal: Option<&PersonalDetails>,
    address: Option<&Address>,
) -> AppResult<ValidProfile> {
    let Some(personal) = personal else {
        return Err(AppError::validation("Personal details are required"));
    };
    let first_name = required(personal.first_name.as_deref(), "First name is required")?;
    let last_name = required(personal.last_name.as_deref(), "Last name is required")?;
    let email = required(personal.email.as_deref(), "Email is required")?;
    let phone = required(personal.phone.as_deref(), "Phone is required")?;

    let Some(address) = address else {
        return Err(AppError::validation("Address is required"));
    };
    let street = required(address.street.as_deref(), "Street is required")?;
    let city = required(address.city.as_deref(), "City is required")?;
    let state = required(address.state.as_deref(), "State is required")?;
    let pincode = required(address.pincode.as_deref(), "Pincode is required")?;

    Ok(ValidProfile {
        first_name,
        last_name,
        email,
        phone,
        gender: non_blank(personal.gender.as_deref()),
        marital_status: non_blank(personal.marital_status.as_deref()),
        street,
        city,
        state,
        pincode,
    })
}

/// Email, then phone. The first duplicate wins.
pub async fn ensure_contact_unique<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    phone: &str,
) -> AppResult<()> {
    let email_taken = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(conn)
        .await?
        .is_some();
    if email_taken {
        return Err(AppError::conflict("Email already exists"));
    }

    let phone_taken = Users::find()
        .filter(UserCol::Phone.eq(phone))
        .one(conn)
        .await?
        .is_some();
    if phone_taken {
        return Err(AppError::conflict("Phone already exists"));
    }
    Ok(())
}

pub async fn ensure_username_free<C: ConnectionTrait>(conn: &C, username: &str) -> AppResult<()> {
    if find_user_by_username(conn, username).await?.is_some() {
        return Err(AppError::conflict("Username already exists"));
    }
    Ok(())
}

pub async fn find_user_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> AppResult<Option<users::Model>> {
    let user = Users::find()
        .filter(UserCol::Username.eq(username.trim()))
        .one(conn)
        .await?;
    Ok(user)
}

/// Resolves the caller and checks the role against the stored record. Non-admin
/// callers must also be approved.
pub async fn require_actor<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    allowed: &[Role],
) -> AppResult<users::Model> {
    if username.trim().is_empty() {
        return Err(AppError::forbidden("Forbidden"));
    }
    let user = match find_user_by_username(conn, username).await? {
        Some(u) => u,
        None => return Err(AppError::forbidden("Forbidden")),
    };
    if !allowed.contains(&user.role) {
        return Err(AppError::forbidden("Forbidden"));
    }
    if user.role != Role::Admin && user.approval_status != Some(ApprovalStatus::Approved) {
        return Err(AppError::forbidden("Account not approved"));
    }
    Ok(user)
}

/// Lowercased ASCII alphanumerics of the email local part, or `user`.
pub fn username_base(email: Option<&str>) -> String {
    let local = email
        .filter(|e| e.contains('@'))
        .and_then(|e| e.split('@').next())
        .unwrap_or("user");
    let base: String = local
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    if base.is_empty() {
        "user".to_string()
    } else {
        base
    }
}

/// First free candidate among `base`, `base<n>` (random n below 10000), and
/// finally `base<6 hex chars>` once the random suffixes keep colliding.
pub async fn generate_username<C: ConnectionTrait>(conn: &C, email: Option<&str>) -> AppResult<String> {
    let base = username_base(email);
    let mut candidate = base.clone();
    let mut attempts = 0;
    while find_user_by_username(conn, &candidate).await?.is_some() {
        attempts += 1;
        if attempts > USERNAME_RANDOM_ATTEMPTS {
            let mut suffix = Uuid::new_v4().simple().to_string();
            suffix.truncate(6);
            candidate = format!("{base}{suffix}");
            break;
        }
        let n: u32 = rand::rng().random_range(0..10_000);
        candidate = format!("{base}{n}");
    }
    Ok(candidate)
}

/// A file already written to the media store.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub key: String,
}

/// Drops empty parts.
pub fn surviving_files(files: Vec<UploadedFile>) -> Vec<UploadedFile> {
    files.into_iter().filter(|f| !f.is_empty()).collect()
}

pub async fn store_uploads(
    media: &dyn MediaStore,
    files: Vec<UploadedFile>,
) -> AppResult<Vec<StoredUpload>> {
    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        match media.put(&file.filename, &file.bytes).await {
            Ok(key) => stored.push(StoredUpload {
                size: file.size(),
                filename: file.filename,
                content_type: file.content_type,
                key,
            }),
            Err(err) => {
                release_all(media, stored.into_iter().map(|s| s.key).collect()).await;
                return Err(AppError::Internal(err));
            }
        }
    }
    Ok(stored)
}

pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub approval_status: ApprovalStatus,
    pub force_password_change: bool,
    pub profile: ValidProfile,
    pub academic_records: Vec<AcademicRecord>,
    pub work_records: Vec<WorkRecord>,
    pub documents: Vec<StoredUpload>,
    /// Roster to join in the same transaction.
    pub roster_cafe_id: Option<i32>,
}

/// Writes the user, its history, documents and optional roster entry as one unit.
/// Stored documents are released if the write fails, and a lost uniqueness race
/// is reported with the same reason the sequential checks would give.
pub async fn create_account(state: &AppState, account: NewAccount) -> AppResult<users::Model> {
    let email = account.profile.email.clone();
    let phone = account.profile.phone.clone();
    let username = account.username.clone();
    let document_keys: Vec<String> = account.documents.iter().map(|d| d.key.clone()).collect();

    let txn = state.orm.begin().await?;
    let result = write_account(&txn, account).await;
    let written = match result {
        Ok(user) => txn.commit().await.map(|_| user),
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    };

    match written {
        Ok(user) => Ok(user),
        Err(err) => {
            release_all(state.media.as_ref(), document_keys).await;
            Err(classify_write_error(&state.orm, err, &email, &phone, &username).await)
        }
    }
}

async fn write_account<C: ConnectionTrait>(conn: &C, account: NewAccount) -> Result<users::Model, DbErr> {
    let now = Utc::now();
    let profile = account.profile;
    let user = UserActive {
        id: NotSet,
        username: Set(account.username),
        password_hash: Set(account.password_hash),
        role: Set(account.role),
        approval_status: Set(Some(account.approval_status)),
        force_password_change: Set(account.force_password_change),
        first_name: Set(Some(profile.first_name)),
        last_name: Set(Some(profile.last_name)),
        email: Set(Some(profile.email)),
        phone: Set(Some(profile.phone)),
        gender: Set(profile.gender),
        marital_status: Set(profile.marital_status),
        street: Set(Some(profile.street)),
        city: Set(Some(profile.city)),
        state: Set(Some(profile.state)),
        pincode: Set(Some(profile.pincode)),
        created_at: Set(now.into()),
    }
    .insert(conn)
    .await?;

    for (position, record) in account.academic_records.into_iter().enumerate() {
        AcademicActive {
            id: NotSet,
            user_id: Set(user.id),
            position: Set(position as i32),
            institution_name: Set(record.institution_name),
            degree: Set(record.degree),
            passing_year: Set(record.passing_year),
            grade: Set(record.grade),
            grade_in_percentage: Set(record.grade_in_percentage),
        }
        .insert(conn)
        .await?;
    }

    for (position, record) in account.work_records.into_iter().enumerate() {
        WorkActive {
            id: NotSet,
            user_id: Set(user.id),
            position: Set(position as i32),
            start_date: Set(record.start_date),
            end_date: Set(record.end_date),
            currently_working: Set(record.currently_working),
            company_name: Set(record.company_name),
            designation: Set(record.designation),
            ctc: Set(record.ctc),
            reason_for_leaving: Set(record.reason_for_leaving),
        }
        .insert(conn)
        .await?;
    }

    for doc in account.documents {
        DocumentActive {
            id: NotSet,
            user_id: Set(user.id),
            document_name: Set(Some(doc.filename)),
            document_type: Set(Some(doc.content_type)),
            size: Set(doc.size),
            storage_key: Set(doc.key),
            created_at: Set(now.into()),
        }
        .insert(conn)
        .await?;
    }

    if let Some(cafe_id) = account.roster_cafe_id {
        StaffActive {
            user_id: Set(user.id),
            cafe_id: Set(cafe_id),
            created_at: Set(now.into()),
        }
        .insert(conn)
        .await?;
    }

    Ok(user)
}

/// Removes the user's roster links, history and document rows, then the user.
/// Returns the document handles for the caller to release after commit.
pub async fn delete_account_rows<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<Vec<String>, DbErr> {
    remove_from_all_rosters(conn, user_id).await?;

    let document_keys: Vec<String> = Documents::find()
        .select_only()
        .column(DocumentCol::StorageKey)
        .filter(DocumentCol::UserId.eq(user_id))
        .into_tuple()
        .all(conn)
        .await?;
    Documents::delete_many()
        .filter(DocumentCol::UserId.eq(user_id))
        .exec(conn)
        .await?;
    AcademicRecords::delete_many()
        .filter(AcademicCol::UserId.eq(user_id))
        .exec(conn)
        .await?;
    WorkRecords::delete_many()
        .filter(WorkCol::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Users::delete_by_id(user_id).exec(conn).await?;
    Ok(document_keys)
}

async fn classify_write_error<C: ConnectionTrait>(
    conn: &C,
    err: DbErr,
    email: &str,
    phone: &str,
    username: &str,
) -> AppError {
    if !is_unique_violation(&err) {
        return AppError::from(err);
    }
    tracing::info!(username, "account insert lost a uniqueness race");
    if let Err(conflict) = ensure_contact_unique(conn, email, phone).await {
        return conflict;
    }
    if let Err(conflict) = ensure_username_free(conn, username).await {
        return conflict;
    }
    AppError::conflict("Account already exists")
}

pub fn user_from_entity(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        role: model.role,
        approval_status: model.approval_status,
        force_password_change: model.force_password_change,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn document_from_entity(model: DocumentModel) -> Document {
    Document {
        id: model.id,
        document_name: model.document_name,
        document_type: model.document_type,
        size: model.size,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_base_uses_local_part() {
        assert_eq!(username_base(Some("Jane.Doe+cafe@example.com")), "janedoecafe");
        assert_eq!(username_base(Some("no-at-sign")), "user");
        assert_eq!(username_base(Some("__@example.com")), "user");
        assert_eq!(username_base(None), "user");
    }

    #[test]
    fn profile_checks_run_in_field_order() {
        let personal = PersonalDetails {
            first_name: Some("Asha".into()),
            last_name: Some("  ".into()),
            email: None,
            ..Default::default()
        };
        let err = validate_profile(Some(&personal), None).unwrap_err();
        assert_eq!(err.to_string(), "Last name is required");

        let personal = PersonalDetails {
            first_name: Some("Asha".into()),
            last_name: Some("Rao".into()),
            email: Some("asha@example.com".into()),
            phone: Some("9000000001".into()),
            ..Default::default()
        };
        let address = Address {
            street: Some("1 Main St".into()),
            city: Some("Pune".into()),
            ..Default::default()
        };
        let err = validate_profile(Some(&personal), Some(&address)).unwrap_err();
        assert_eq!(err.to_string(), "State is required");
    }
}
