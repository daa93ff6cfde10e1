use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::sea_orm_active_enums::Role,
    models::{AcademicRecord, Address, User, WorkRecord},
};

#[derive(Deserialize, Debug, Default, Clone, ToSchema)]
pub struct PersonalDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
}

/// Sent as the `data` part of a multipart form; files ride along as `documents` parts.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct RegisterRequest {
    /// Role token, one of ADMIN, OWNER, CHEF, WAITER, CUSTOMER.
    pub role: String,
    /// Required for ADMIN, CHEF and WAITER.
    pub registration_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub personal_details: Option<PersonalDetails>,
    pub address: Option<Address>,
    pub academic_records: Option<Vec<AcademicRecord>>,
    pub work_records: Option<Vec<WorkRecord>>,
    /// When true at least one non-empty document must be attached.
    #[serde(default)]
    pub documents_required: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: User,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
    pub force_password_change: bool,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct ChangePasswordRequest {
    pub username: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
