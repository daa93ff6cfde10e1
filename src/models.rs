use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::sea_orm_active_enums::{ApprovalStatus, FunctionType, Role};

#[derive(Debug, Serialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub approval_status: Option<ApprovalStatus>,
    pub force_password_change: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserWithDocuments {
    #[serde(flatten)]
    pub user: User,
    pub documents: Vec<Document>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub address: Address,
    pub academic_records: Vec<AcademicRecord>,
    pub work_records: Vec<WorkRecord>,
    pub documents: Vec<Document>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct AcademicRecord {
    pub institution_name: Option<String>,
    pub degree: Option<String>,
    pub passing_year: Option<i32>,
    pub grade: Option<String>,
    pub grade_in_percentage: Option<f64>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkRecord {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub currently_working: bool,
    pub company_name: Option<String>,
    pub designation: Option<String>,
    pub ctc: Option<f64>,
    pub reason_for_leaving: Option<String>,
}

/// Metadata only; bytes are served by the download endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct Document {
    pub id: i32,
    pub document_name: Option<String>,
    pub document_type: Option<String>,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Owner {
    pub id: i32,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub approval_status: Option<ApprovalStatus>,
    pub has_cafe: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffMember {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub force_password_change: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Cafe {
    pub id: i32,
    pub owner_id: i32,
    pub owner_username: Option<String>,
    pub cafe_name: String,
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
    pub active: bool,
    pub approval_status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CafeDocument {
    pub id: i32,
    pub cafe_id: i32,
    pub doc_key: String,
    pub document_name: Option<String>,
    pub document_type: Option<String>,
    pub size: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CafeImage {
    pub id: i32,
    pub cafe_id: i32,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub cover: bool,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItem {
    pub id: i32,
    pub cafe_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub available: bool,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FunctionCapacity {
    pub id: i32,
    pub cafe_id: i32,
    pub function_type: FunctionType,
    pub tables_available: i32,
    pub seats_available: Option<i32>,
    pub price: Option<i64>,
    pub enabled: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Booking {
    pub id: i32,
    pub cafe_id: i32,
    pub customer_username: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub booking_date: String,
    pub booking_time: String,
    pub guests: i32,
    pub note: Option<String>,
    pub amenity_preference: Option<String>,
    pub allocated_table: Option<String>,
    pub status: String,
    pub denial_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Order {
    pub id: i32,
    pub cafe_id: i32,
    pub customer_username: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub status: String,
    pub total_amount: i64,
    pub amenity_preference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub menu_item_id: i32,
    pub item_name: String,
    pub price: i64,
    pub qty: i32,
}

/// Listing card for the public cafe directory.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicCafe {
    pub id: i32,
    pub cafe_name: String,
    pub description: Option<String>,
    pub city: Option<String>,
    pub address_line: Option<String>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub phone: Option<String>,
    pub cover_image_url: Option<String>,
}
