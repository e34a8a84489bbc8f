pub mod api;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod local_store;
pub mod model;
pub mod repository;
pub mod routes;
