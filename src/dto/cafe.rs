use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::auth::PersonalDetails,
    entity::sea_orm_active_enums::ApprovalStatus,
    models::{AcademicRecord, Address, CafeDocument, CafeImage, StaffMember, User, WorkRecord},
};

/// Profile fields are overwritten only when present.
#[derive(Debug, Deserialize, Default, Clone, ToSchema)]
pub struct CafeProfileRequest {
    pub cafe_name: Option<String>,
    /// Public visibility. Left unchanged when absent; new cafes start active.
    pub active: Option<bool>,
    pub owner_names: Option<String>,
    pub poc_designation: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub whatsapp_number: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub fssai_number: Option<String>,
    pub pan_number: Option<String>,
    pub gstin: Option<String>,
    pub shop_license_number: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc: Option<String>,
    pub bank_account_holder_name: Option<String>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct AdminCreateCafeRequest {
    pub owner_username: Option<String>,
    #[serde(flatten)]
    pub profile: CafeProfileRequest,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CafeApprovalRequest {
    pub status: ApprovalStatus,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct StaffCreateRequest {
    /// CHEF or WAITER.
    pub role: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub personal_details: Option<PersonalDetails>,
    pub address: Option<Address>,
    pub academic_records: Option<Vec<AcademicRecord>>,
    pub work_records: Option<Vec<WorkRecord>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffCreated {
    pub user: User,
    /// Present only when the password was generated.
    pub temp_password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffList {
    pub items: Vec<StaffMember>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CafeImageList {
    pub items: Vec<CafeImage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CafeDocumentList {
    pub items: Vec<CafeDocument>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct ImageUploadQuery {
    #[serde(default)]
    pub cover: bool,
}
