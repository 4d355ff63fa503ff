//! Controllers
//!
//! Request orchestration between the HTTP routes and the repositories.

pub mod vehicle_controller;

pub use vehicle_controller::VehicleController;
