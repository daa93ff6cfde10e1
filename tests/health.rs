mod common;

use axum::{extract::State, http::StatusCode};
use cafe_hub_api::routes::health::health_check;

#[tokio::test]
async fn health_check_reports_database_up() -> anyhow::Result<()> {
    let ctx = common::setup().await?;

    let (status, body) = health_check(State(ctx.state.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.0.message, "Health check");

    let data = body.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "up");
    Ok(())
}

#[tokio::test]
async fn health_check_degrades_when_the_database_is_gone() -> anyhow::Result<()> {
    let ctx = common::setup().await?;
    ctx.state.orm.clone().close().await?;

    let (status, body) = health_check(State(ctx.state.clone())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.0.data.expect("health data").database, "down");
    Ok(())
}
