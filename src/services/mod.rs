pub mod admin_service;
pub mod auth_service;
pub mod booking_service;
pub mod cafe_media;
pub mod catalog_service;
pub mod identity;
pub mod order_service;
pub mod owner_service;
pub mod public_service;
pub mod tenant;
