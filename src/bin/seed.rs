use cafe_hub_api::{
    config::AppConfig,
    credentials::hash_password,
    db::{create_orm_conn, run_migrations},
    entity::{
        sea_orm_active_enums::{ApprovalStatus, Role},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};

/// Usage: `seed [username] [password]`, falling back to `SEED_ADMIN_USERNAME`
/// and `SEED_ADMIN_PASSWORD`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let mut args = std::env::args().skip(1);
    let username = args
        .next()
        .or_else(|| std::env::var("SEED_ADMIN_USERNAME").ok())
        .unwrap_or_else(|| "admin".to_string());
    let password = args
        .next()
        .or_else(|| std::env::var("SEED_ADMIN_PASSWORD").ok())
        .unwrap_or_else(|| "admin123".to_string());
    let email = std::env::var("SEED_ADMIN_EMAIL").ok().filter(|e| !e.trim().is_empty());

    let admin_id = ensure_admin(&orm, &username, &password, email).await?;
    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(
    orm: &sea_orm::DatabaseConnection,
    username: &str,
    password: &str,
    email: Option<String>,
) -> anyhow::Result<i32> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let existing = Users::find()
        .filter(UserCol::Username.eq(username))
        .one(orm)
        .await?;

    // If the account already exists, promote it and reset the password.
    let admin = match existing {
        Some(user) => {
            let mut active: UserActive = user.into();
            active.role = Set(Role::Admin);
            active.approval_status = Set(Some(ApprovalStatus::Approved));
            active.password_hash = Set(password_hash);
            active.force_password_change = Set(false);
            active.update(orm).await?
        }
        None => {
            UserActive {
                id: NotSet,
                username: Set(username.to_string()),
                password_hash: Set(password_hash),
                role: Set(Role::Admin),
                approval_status: Set(Some(ApprovalStatus::Approved)),
                force_password_change: Set(false),
                email: Set(email),
                created_at: Set(Utc::now().into()),
                ..Default::default()
            }
            .insert(orm)
            .await?
        }
    };

    println!("Ensured admin {username}");
    Ok(admin.id)
}
