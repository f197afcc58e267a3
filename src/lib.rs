//! CRUD service for two resources, Items and Todos, over SQLite.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
