//! Barcode label print queue
//!
//! Accepts label print jobs over HTTP, persists them, and dispatches them to a
//! TSPL label printer through a fixed pool of polling workers with bounded
//! retries and stale-claim reclamation.

pub mod app_state;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
pub mod telemetry;
