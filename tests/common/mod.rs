#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use cafe_hub_api::{
    config::AppConfig,
    credentials::hash_password,
    db::run_migrations,
    dto::{
        auth::{PersonalDetails, RegisterRequest},
        cafe::{CafeApprovalRequest, CafeProfileRequest},
    },
    entity::{
        cafes,
        sea_orm_active_enums::{ApprovalStatus, Role},
        users::{self, ActiveModel as UserActive},
    },
    media::{MediaStore, UploadedFile},
    middleware::auth::AuthUser,
    models::Address,
    notifier::Notifier,
    services::{admin_service, owner_service},
    state::AppState,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ConnectOptions, Database, EntityTrait, Set};

pub const PASSWORD: &str = "secret-pass";
pub const REGISTRATION_KEY: &str = "let-me-in";

/// Blob store kept in memory. Removals can be made to fail to exercise orphan reporting.
#[derive(Default)]
pub struct MemoryMediaStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    next: AtomicUsize,
    pub fail_removals: AtomicBool,
}

impl MemoryMediaStore {
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn put(&self, filename: &str, bytes: &[u8]) -> anyhow::Result<String> {
        let key = format!("{}_{}", self.next.fetch_add(1, Ordering::SeqCst), filename);
        self.blobs.lock().unwrap().insert(key.clone(), bytes.to_vec());
        Ok(key)
    }

    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing blob {key}"))
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        if self.fail_removals.load(Ordering::SeqCst) {
            anyhow::bail!("storage unavailable");
        }
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Credentials {
        to: String,
        username: String,
        password: String,
    },
    Denied {
        to: String,
        reason: Option<String>,
    },
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_credentials(&self, to: &str, username: &str, temp_password: &str) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("mail api down");
        }
        self.sent.lock().unwrap().push(Sent::Credentials {
            to: to.to_string(),
            username: username.to_string(),
            password: temp_password.to_string(),
        });
        Ok(())
    }

    async fn send_denied(&self, to: &str, reason: Option<&str>) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("mail api down");
        }
        self.sent.lock().unwrap().push(Sent::Denied {
            to: to.to_string(),
            reason: reason.map(str::to_string),
        });
        Ok(())
    }
}

pub struct TestContext {
    pub state: AppState,
    pub media: Arc<MemoryMediaStore>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Fresh in-memory SQLite database with every migration applied.
pub async fn setup() -> anyhow::Result<TestContext> {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    // One connection, otherwise every pooled connection gets its own database.
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let orm = Database::connect(opts).await?;
    run_migrations(&orm).await?;

    let media = Arc::new(MemoryMediaStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        jwt_ttl_hours: 1,
        admin_registration_key: Some(REGISTRATION_KEY.to_string()),
        media_dir: "unused".to_string(),
        mail: None,
        max_upload_bytes: 1024 * 1024,
    };

    let state = AppState {
        orm,
        config: Arc::new(config),
        media: media.clone(),
        notifier: notifier.clone(),
    };
    Ok(TestContext {
        state,
        media,
        notifier,
    })
}

pub fn personal(email: &str, phone: &str) -> PersonalDetails {
    PersonalDetails {
        first_name: Some("Asha".to_string()),
        last_name: Some("Rao".to_string()),
        email: Some(email.to_string()),
        phone: Some(phone.to_string()),
        gender: None,
        marital_status: None,
    }
}

pub fn address() -> Address {
    Address {
        street: Some("12 MG Road".to_string()),
        city: Some("Pune".to_string()),
        state: Some("MH".to_string()),
        pincode: Some("411001".to_string()),
    }
}

/// A registration that passes every field check.
pub fn registration(role: &str, email: &str, phone: &str) -> RegisterRequest {
    RegisterRequest {
        role: role.to_string(),
        registration_key: None,
        username: None,
        password: None,
        personal_details: Some(personal(email, phone)),
        address: Some(address()),
        academic_records: Some(Vec::new()),
        work_records: Some(Vec::new()),
        documents_required: false,
    }
}

pub fn upload(name: &str, bytes: &[u8]) -> UploadedFile {
    UploadedFile {
        filename: name.to_string(),
        content_type: "application/pdf".to_string(),
        bytes: bytes.to_vec(),
    }
}

/// Inserts a user directly, password [`PASSWORD`].
pub async fn seed_user(
    ctx: &TestContext,
    username: &str,
    role: Role,
    status: Option<ApprovalStatus>,
    phone: Option<&str>,
) -> anyhow::Result<users::Model> {
    let user = UserActive {
        id: NotSet,
        username: Set(username.to_string()),
        password_hash: Set(hash_password(PASSWORD)?),
        role: Set(role),
        approval_status: Set(status),
        force_password_change: Set(false),
        email: Set(Some(format!("{username}@example.com"))),
        phone: Set(phone.map(str::to_string)),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&ctx.state.orm)
    .await?;
    Ok(user)
}

pub async fn seed_admin(ctx: &TestContext) -> anyhow::Result<AuthUser> {
    seed_user(ctx, "root", Role::Admin, Some(ApprovalStatus::Approved), None).await?;
    Ok(AuthUser::new("root"))
}

pub async fn seed_customer(ctx: &TestContext, username: &str, phone: &str) -> anyhow::Result<AuthUser> {
    seed_user(ctx, username, Role::Customer, Some(ApprovalStatus::Approved), Some(phone)).await?;
    Ok(AuthUser::new(username))
}

/// Approved owner whose cafe was created through the owner flow and then
/// approved by `admin`, so it is open to the public.
pub async fn seed_open_cafe(
    ctx: &TestContext,
    admin: &AuthUser,
    owner_username: &str,
    cafe_name: &str,
) -> anyhow::Result<(AuthUser, cafes::Model)> {
    seed_user(ctx, owner_username, Role::Owner, Some(ApprovalStatus::Approved), None).await?;
    let owner = AuthUser::new(owner_username);

    let created = owner_service::upsert_cafe(
        &ctx.state,
        &owner,
        CafeProfileRequest {
            cafe_name: Some(cafe_name.to_string()),
            city: Some("Pune".to_string()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("cafe");

    admin_service::set_cafe_approval(
        &ctx.state,
        admin,
        created.id,
        CafeApprovalRequest {
            status: ApprovalStatus::Approved,
            active: Some(true),
        },
    )
    .await?;

    let cafe = cafe_hub_api::entity::Cafes::find_by_id(created.id)
        .one(&ctx.state.orm)
        .await?
        .expect("cafe row");
    Ok((owner, cafe))
}
