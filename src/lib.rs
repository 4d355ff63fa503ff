//! Dealership vehicle catalog
//!
//! Record store, asset store and query engine behind an axum API, plus the
//! client-side cache and offline fallback used by catalog consumers.

pub mod cache;
pub mod client;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
