mod common;

use cafe_hub_api::{
    dto::catalog::{CreateMenuItemRequest, UpdateMenuItemRequest, UpsertCapacityRequest},
    entity::{FunctionCapacities, sea_orm_active_enums::FunctionType},
    services::{catalog_service, public_service},
};
use common::{seed_admin, seed_open_cafe, setup, upload};
use sea_orm::{EntityTrait, PaginatorTrait};

fn item(name: &str, price: i64) -> CreateMenuItemRequest {
    CreateMenuItemRequest {
        name: Some(name.to_string()),
        price: Some(price),
        ..Default::default()
    }
}

fn capacity(function_type: &str, tables: i32) -> UpsertCapacityRequest {
    UpsertCapacityRequest {
        function_type: function_type.to_string(),
        tables_available: Some(tables),
        ..Default::default()
    }
}

#[tokio::test]
async fn menu_items_are_validated_before_anything_is_written() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, _) = seed_open_cafe(&ctx, &admin, "anil", "Anil's").await?;

    let cases = [
        (
            CreateMenuItemRequest {
                name: Some("  ".to_string()),
                price: Some(100),
                ..Default::default()
            },
            "Name is required",
        ),
        (
            CreateMenuItemRequest {
                name: Some("Dosa".to_string()),
                ..Default::default()
            },
            "Price is required",
        ),
        (item("Dosa", -1), "Price must not be negative"),
    ];
    for (req, message) in cases {
        let err = catalog_service::create_menu_item(&ctx.state, &owner, req)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation_failed");
        assert_eq!(err.to_string(), message);
    }

    let created = catalog_service::create_menu_item(&ctx.state, &owner, item("Dosa", 0))
        .await?
        .data
        .expect("item");
    assert!(created.available);
    assert!(created.image_url.is_none());
    Ok(())
}

#[tokio::test]
async fn menu_items_of_another_cafe_read_as_missing() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, _) = seed_open_cafe(&ctx, &admin, "bela", "Bela's").await?;
    let (intruder, _) = seed_open_cafe(&ctx, &admin, "chad", "Chad's").await?;

    let created = catalog_service::create_menu_item(&ctx.state, &owner, item("Idli", 4000))
        .await?
        .data
        .expect("item");

    let err = catalog_service::update_menu_item(
        &ctx.state,
        &intruder,
        created.id,
        UpdateMenuItemRequest {
            price: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Menu item not found");

    let err = catalog_service::delete_menu_item(&ctx.state, &intruder, created.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");

    let err = catalog_service::upload_menu_image(
        &ctx.state,
        &intruder,
        created.id,
        Some(upload("x.jpg", b"x")),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "not_found");
    assert_eq!(ctx.media.len(), 0);

    let mine = catalog_service::list_menu(&ctx.state, &owner)
        .await?
        .data
        .expect("menu")
        .items;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].price, 4000);
    let theirs = catalog_service::list_menu(&ctx.state, &intruder)
        .await?
        .data
        .expect("menu")
        .items;
    assert!(theirs.is_empty());
    Ok(())
}

#[tokio::test]
async fn partial_update_keeps_untouched_fields() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, _) = seed_open_cafe(&ctx, &admin, "dev", "Dev's").await?;

    let created = catalog_service::create_menu_item(
        &ctx.state,
        &owner,
        CreateMenuItemRequest {
            name: Some("Vada".to_string()),
            price: Some(3000),
            category: Some("Snacks".to_string()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("item");

    let err = catalog_service::update_menu_item(
        &ctx.state,
        &owner,
        created.id,
        UpdateMenuItemRequest {
            name: Some(String::new()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Name is required");

    let updated = catalog_service::update_menu_item(
        &ctx.state,
        &owner,
        created.id,
        UpdateMenuItemRequest {
            available: Some(false),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("item");
    assert!(!updated.available);
    assert_eq!(updated.name, "Vada");
    assert_eq!(updated.price, 3000);
    assert_eq!(updated.category.as_deref(), Some("Snacks"));
    Ok(())
}

#[tokio::test]
async fn replacing_a_menu_image_releases_the_previous_file() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, cafe) = seed_open_cafe(&ctx, &admin, "esha", "Esha's").await?;
    let created = catalog_service::create_menu_item(&ctx.state, &owner, item("Poha", 2500))
        .await?
        .data
        .expect("item");

    let err = catalog_service::upload_menu_image(&ctx.state, &owner, created.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Image file is required");

    catalog_service::upload_menu_image(&ctx.state, &owner, created.id, Some(upload("v1.jpg", b"one")))
        .await?;
    let second = catalog_service::upload_menu_image(
        &ctx.state,
        &owner,
        created.id,
        Some(upload("v2.jpg", b"two")),
    )
    .await?
    .data
    .expect("item");
    assert_eq!(ctx.media.len(), 1);
    assert_eq!(
        second.image_url.as_deref(),
        Some(format!("/api/public/cafes/{}/menu/{}/image", cafe.id, created.id).as_str())
    );

    let image = public_service::menu_image_bytes(&ctx.state, cafe.id, created.id).await?;
    assert_eq!(image.bytes, b"two");
    assert_eq!(image.filename, "v2.jpg");

    catalog_service::delete_menu_item(&ctx.state, &owner, created.id).await?;
    assert_eq!(ctx.media.len(), 0);
    Ok(())
}

#[tokio::test]
async fn capacities_upsert_per_function_type() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, _) = seed_open_cafe(&ctx, &admin, "farah", "Farah's").await?;
    let (other, _) = seed_open_cafe(&ctx, &admin, "gopal", "Gopal's").await?;

    let err = catalog_service::upsert_capacity(&ctx.state, &owner, capacity("WEDDING", 2))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid function type");
    let err = catalog_service::upsert_capacity(&ctx.state, &owner, capacity("birthday", 2))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid function type");
    let err = catalog_service::upsert_capacity(&ctx.state, &owner, capacity("BIRTHDAY", -1))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Tables available must not be negative");

    let first = catalog_service::upsert_capacity(&ctx.state, &owner, capacity("BIRTHDAY", 2))
        .await?
        .data
        .expect("capacity");
    let second = catalog_service::upsert_capacity(
        &ctx.state,
        &owner,
        UpsertCapacityRequest {
            function_type: "BIRTHDAY".to_string(),
            tables_available: Some(5),
            seats_available: Some(20),
            price: Some(150_000),
            enabled: Some(false),
        },
    )
    .await?
    .data
    .expect("capacity");
    assert_eq!(first.id, second.id);
    assert_eq!(second.function_type, FunctionType::Birthday);
    assert_eq!(second.tables_available, 5);
    assert!(!second.enabled);

    catalog_service::upsert_capacity(&ctx.state, &owner, capacity("GET_TOGETHER", 1)).await?;
    catalog_service::upsert_capacity(&ctx.state, &other, capacity("BIRTHDAY", 1)).await?;
    assert_eq!(FunctionCapacities::find().count(&ctx.state.orm).await?, 3);

    let listed = catalog_service::list_capacities(&ctx.state, &owner)
        .await?
        .data
        .expect("capacities")
        .items;
    assert_eq!(listed.len(), 2);

    let err = catalog_service::delete_capacity(&ctx.state, &other, first.id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Function capacity not found");
    catalog_service::delete_capacity(&ctx.state, &owner, first.id).await?;
    assert_eq!(FunctionCapacities::find().count(&ctx.state.orm).await?, 2);
    Ok(())
}

#[tokio::test]
async fn public_menu_lists_available_items_of_open_cafes_only() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, cafe) = seed_open_cafe(&ctx, &admin, "hari", "Hari's").await?;

    catalog_service::create_menu_item(&ctx.state, &owner, item("Upma", 2000)).await?;
    catalog_service::create_menu_item(
        &ctx.state,
        &owner,
        CreateMenuItemRequest {
            name: Some("Seasonal special".to_string()),
            price: Some(9000),
            available: Some(false),
            ..Default::default()
        },
    )
    .await?;

    let public = public_service::menu(&ctx.state, cafe.id)
        .await?
        .data
        .expect("menu")
        .items;
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].name, "Upma");

    let admin_view = cafe_hub_api::services::admin_service::cafe_menu(&ctx.state, &admin, cafe.id)
        .await?
        .data
        .expect("menu")
        .items;
    assert_eq!(admin_view.len(), 2);

    let err = public_service::menu(&ctx.state, cafe.id + 100).await.unwrap_err();
    assert_eq!(err.to_string(), "Cafe not found");
    Ok(())
}

#[tokio::test]
async fn images_of_unavailable_items_are_not_served_publicly() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, cafe) = seed_open_cafe(&ctx, &admin, "ivan", "Ivan's").await?;
    let created = catalog_service::create_menu_item(&ctx.state, &owner, item("Kulfi", 5000))
        .await?
        .data
        .expect("item");
    catalog_service::upload_menu_image(&ctx.state, &owner, created.id, Some(upload("kulfi.jpg", b"cold")))
        .await?;
    public_service::menu_image_bytes(&ctx.state, cafe.id, created.id).await?;

    catalog_service::update_menu_item(
        &ctx.state,
        &owner,
        created.id,
        UpdateMenuItemRequest {
            available: Some(false),
            ..Default::default()
        },
    )
    .await?;
    let err = public_service::menu_image_bytes(&ctx.state, cafe.id, created.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
    assert_eq!(err.to_string(), "Menu item not found");
    Ok(())
}
