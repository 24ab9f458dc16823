pub mod api;
pub mod bootstrap;
pub mod config;
pub mod database;
pub mod events;
pub mod models;
pub mod repository;
pub mod services;
