use axum::{
    Router,
    extract::Multipart,
    http::header,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    media::{Download, UploadedFile},
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod customer;
pub mod doc;
pub mod health;
pub mod owner;
pub mod params;
pub mod public;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/owner", owner::router())
        .nest("/customer", customer::router())
        .nest("/public", public::router())
}

/// A multipart body split into its optional `data` JSON part and its file parts.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub data: Option<Vec<u8>>,
    pub files: Vec<UploadedFile>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = MultipartForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation(format!("Invalid multipart request: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(|s| s.to_string());
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Failed to read upload: {e}")))?;

            match (name.as_str(), filename) {
                ("data", None) => form.data = Some(bytes.to_vec()),
                (_, Some(filename)) => form.files.push(UploadedFile {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                }),
                _ => tracing::debug!(field = %name, "ignoring multipart field"),
            }
        }
        Ok(form)
    }

    /// Parses the `data` part. A missing part yields the payload's defaults.
    pub fn payload<T: DeserializeOwned + Default>(&self) -> AppResult<T> {
        match &self.data {
            Some(raw) => serde_json::from_slice(raw)
                .map_err(|e| AppError::validation(format!("Invalid data part: {e}"))),
            None => Ok(T::default()),
        }
    }

    pub fn first_file(self) -> Option<UploadedFile> {
        self.files.into_iter().next()
    }
}

impl IntoResponse for Download {
    fn into_response(self) -> Response {
        let headers = [
            (header::CONTENT_TYPE, self.header_content_type().to_string()),
            (header::CONTENT_DISPOSITION, self.content_disposition()),
        ];
        (
            headers,
            self.bytes,
        )
            .into_response()
    }
}
