//! Cafe documents and gallery images. Callers resolve and authorize the cafe;
//! everything here is scoped by the cafe id they pass in.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;

use crate::{
    db::is_unique_violation,
    entity::{
        cafe_documents::{
            ActiveModel as CafeDocActive, Column as CafeDocCol, Entity as CafeDocuments,
            Model as CafeDocModel,
        },
        cafe_images::{ActiveModel as ImageActive, Column as ImageCol, Entity as CafeImages, Model as ImageModel},
    },
    error::{AppError, AppResult},
    media::{Download, MediaStore, UploadedFile, release_all},
    models::{CafeDocument, CafeImage},
    services::identity::non_blank,
    state::AppState,
};

pub async fn list_documents<C: ConnectionTrait>(conn: &C, cafe_id: i32) -> AppResult<Vec<CafeDocument>> {
    let docs = CafeDocuments::find()
        .filter(CafeDocCol::CafeId.eq(cafe_id))
        .order_by_asc(CafeDocCol::DocKey)
        .all(conn)
        .await?
        .into_iter()
        .map(cafe_document_from_entity)
        .collect();
    Ok(docs)
}

/// One document per (cafe, key); a new upload replaces the old file.
pub async fn upsert_document(
    state: &AppState,
    cafe_id: i32,
    doc_key: &str,
    file: Option<UploadedFile>,
) -> AppResult<CafeDocument> {
    let doc_key = non_blank(Some(doc_key)).ok_or_else(|| AppError::validation("Document key is required"))?;
    let file = match file.filter(|f| !f.is_empty()) {
        Some(f) => f,
        None => return Err(AppError::validation("File is required")),
    };

    let key = state
        .media
        .put(&file.filename, &file.bytes)
        .await
        .map_err(AppError::Internal)?;

    let existing = CafeDocuments::find()
        .filter(CafeDocCol::CafeId.eq(cafe_id))
        .filter(CafeDocCol::DocKey.eq(doc_key.as_str()))
        .one(&state.orm)
        .await?;

    let now = Utc::now();
    let (saved, replaced_key) = match existing {
        Some(doc) => {
            let old_key = doc.storage_key.clone();
            let mut active: CafeDocActive = doc.into();
            active.document_name = Set(Some(file.filename.clone()));
            active.document_type = Set(Some(file.content_type.clone()));
            active.size = Set(file.size());
            active.storage_key = Set(key.clone());
            active.updated_at = Set(now.into());
            (active.update(&state.orm).await, Some(old_key))
        }
        None => {
            let insert = CafeDocActive {
                id: NotSet,
                cafe_id: Set(cafe_id),
                doc_key: Set(doc_key.clone()),
                document_name: Set(Some(file.filename.clone())),
                document_type: Set(Some(file.content_type.clone())),
                size: Set(file.size()),
                storage_key: Set(key.clone()),
                updated_at: Set(now.into()),
            }
            .insert(&state.orm)
            .await;
            (insert, None)
        }
    };

    let saved = match saved {
        Ok(doc) => doc,
        Err(err) => {
            release_all(state.media.as_ref(), vec![key]).await;
            if is_unique_violation(&err) {
                return Err(AppError::conflict("Document key already exists"));
            }
            return Err(err.into());
        }
    };

    if let Some(old_key) = replaced_key {
        release_all(state.media.as_ref(), vec![old_key]).await;
    }

    Ok(cafe_document_from_entity(saved))
}

pub async fn download_document(state: &AppState, cafe_id: i32, doc_id: i32) -> AppResult<Download> {
    let doc = CafeDocuments::find_by_id(doc_id)
        .filter(CafeDocCol::CafeId.eq(cafe_id))
        .one(&state.orm)
        .await?;
    let doc = match doc {
        Some(d) => d,
        None => return Err(AppError::not_found("Document not found")),
    };
    let bytes = fetch(state.media.as_ref(), &doc.storage_key).await?;
    Ok(Download {
        filename: doc.document_name.unwrap_or_else(|| doc.doc_key.clone()),
        content_type: doc
            .document_type
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        bytes,
    })
}

pub async fn list_images<C: ConnectionTrait>(conn: &C, cafe_id: i32) -> AppResult<Vec<CafeImage>> {
    let images = CafeImages::find()
        .filter(ImageCol::CafeId.eq(cafe_id))
        .order_by_asc(ImageCol::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(image_from_entity)
        .collect();
    Ok(images)
}

pub async fn upload_image(
    state: &AppState,
    cafe_id: i32,
    file: Option<UploadedFile>,
    cover: bool,
) -> AppResult<CafeImage> {
    let file = match file.filter(|f| !f.is_empty()) {
        Some(f) => f,
        None => return Err(AppError::validation("Image file is required")),
    };

    let key = state
        .media
        .put(&file.filename, &file.bytes)
        .await
        .map_err(AppError::Internal)?;

    let txn = state.orm.begin().await?;
    let result = async {
        if cover {
            CafeImages::update_many()
                .col_expr(ImageCol::Cover, Expr::value(false))
                .filter(ImageCol::CafeId.eq(cafe_id))
                .exec(&txn)
                .await?;
        }
        ImageActive {
            id: NotSet,
            cafe_id: Set(cafe_id),
            filename: Set(file.filename.clone()),
            content_type: Set(file.content_type.clone()),
            storage_key: Set(key.clone()),
            size: Set(file.size()),
            cover: Set(cover),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
    }
    .await;

    match result {
        Ok(image) => {
            txn.commit().await?;
            Ok(image_from_entity(image))
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            release_all(state.media.as_ref(), vec![key]).await;
            Err(err.into())
        }
    }
}

/// Row first, then the file; a file that will not go away is only logged.
pub async fn delete_image(state: &AppState, cafe_id: i32, image_id: i32) -> AppResult<()> {
    let image = find_image(&state.orm, cafe_id, image_id).await?;
    CafeImages::delete_by_id(image.id).exec(&state.orm).await?;
    release_all(state.media.as_ref(), vec![image.storage_key]).await;
    Ok(())
}

pub async fn download_image(state: &AppState, cafe_id: i32, image_id: i32) -> AppResult<Download> {
    let image = find_image(&state.orm, cafe_id, image_id).await?;
    let bytes = fetch(state.media.as_ref(), &image.storage_key).await?;
    Ok(Download {
        filename: image.filename,
        content_type: image.content_type,
        bytes,
    })
}

async fn find_image<C: ConnectionTrait>(conn: &C, cafe_id: i32, image_id: i32) -> AppResult<ImageModel> {
    let image = CafeImages::find_by_id(image_id)
        .filter(ImageCol::CafeId.eq(cafe_id))
        .one(conn)
        .await?;
    match image {
        Some(i) => Ok(i),
        None => Err(AppError::not_found("Image not found")),
    }
}

/// A row whose blob is gone reads as not found.
pub async fn fetch(media: &dyn MediaStore, key: &str) -> AppResult<Vec<u8>> {
    media.get(key).await.map_err(|err| {
        tracing::warn!(error = %err, key, "media read failed");
        AppError::not_found("File not found")
    })
}

pub fn image_url(cafe_id: i32, image_id: i32) -> String {
    format!("/api/public/cafes/{cafe_id}/images/{image_id}")
}

pub fn image_from_entity(model: ImageModel) -> CafeImage {
    CafeImage {
        id: model.id,
        cafe_id: model.cafe_id,
        url: image_url(model.cafe_id, model.id),
        filename: model.filename,
        content_type: model.content_type,
        size: model.size,
        cover: model.cover,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn cafe_document_from_entity(model: CafeDocModel) -> CafeDocument {
    CafeDocument {
        id: model.id,
        cafe_id: model.cafe_id,
        doc_key: model.doc_key,
        document_name: model.document_name,
        document_type: model.document_type,
        size: model.size,
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
