use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, media::MediaStore, notifier::Notifier};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub media: Arc<dyn MediaStore>,
    pub notifier: Arc<dyn Notifier>,
}
