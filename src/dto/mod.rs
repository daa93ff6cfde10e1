pub mod admin;
pub mod auth;
pub mod bookings;
pub mod cafe;
pub mod catalog;
pub mod orders;
