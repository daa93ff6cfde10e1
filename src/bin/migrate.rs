use cafe_hub_api::{config::AppConfig, db::create_orm_conn, migration::Migrator};
use sea_orm_migration::MigratorTrait;

/// Usage: `migrate [up|status|fresh]`. `fresh` drops every table first.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sea_orm_migration=info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;

    match std::env::args().nth(1).as_deref().unwrap_or("up") {
        "up" => {
            let pending = Migrator::get_pending_migrations(&orm).await?.len();
            Migrator::up(&orm, None).await?;
            tracing::info!(applied = pending, "migrations applied");
        }
        "status" => Migrator::status(&orm).await?,
        "fresh" => {
            tracing::warn!("dropping all tables before re-applying migrations");
            Migrator::fresh(&orm).await?;
        }
        other => anyhow::bail!("unknown command {other:?}, expected up, status or fresh"),
    }
    Ok(())
}
