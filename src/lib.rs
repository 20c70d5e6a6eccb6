pub mod api;
pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
