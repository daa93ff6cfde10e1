use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::auth::PersonalDetails,
    routes::params::Pagination,
    models::{Address, Cafe, Owner, User, UserWithDocuments},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<UserWithDocuments>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OwnerList {
    pub items: Vec<Owner>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CafeList {
    pub items: Vec<Cafe>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct DenyRequest {
    pub reason: Option<String>,
}

/// Approval hands back the one-time password alongside the emailed copy.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApprovalResponse {
    pub user: User,
    pub temp_password: String,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct CreateOwnerRequest {
    pub role: Option<String>,
    pub username: Option<String>,
    pub personal_details: Option<PersonalDetails>,
    pub address: Option<Address>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOwnerResponse {
    pub user: User,
    pub temp_password: String,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Optional role token filter.
    pub role: Option<String>,
    /// Optional approval status filter.
    pub status: Option<String>,
}

impl UserListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeardownReport {
    pub cafe_id: i32,
    pub staff_released: u64,
    pub images_deleted: u64,
    pub menu_items_deleted: u64,
    pub capacities_deleted: u64,
    pub documents_deleted: u64,
    pub bookings_deleted: u64,
    pub orders_deleted: u64,
    /// Media handles that could not be removed from storage.
    pub orphaned_media: Vec<String>,
}
