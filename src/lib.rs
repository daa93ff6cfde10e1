pub mod audit;
pub mod config;
pub mod credentials;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod media;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod notifier;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
