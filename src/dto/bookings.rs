use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Booking;

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct CreateBookingRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub booking_date: Option<String>,
    pub booking_time: Option<String>,
    pub guests: Option<i32>,
    pub note: Option<String>,
    pub amenity_preference: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingDecision {
    Accept,
    Deny,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecideBookingRequest {
    pub decision: BookingDecision,
    pub allocated_table: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<Booking>,
}
