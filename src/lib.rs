//! Collects email subscriptions over HTTP and looks them up again.
//!
//! `POST /api/subscribe` stores a new record for a valid email,
//! `GET /api/lookup?email=..` returns every record stored for an email.

pub mod app;
pub mod config;
mod error;
pub mod model;
pub mod store;
pub mod telemetry;
pub mod web;

pub use app::{App, AppState};
pub use error::{Error, Result};
pub use web::serve;
