pub mod analytics;
pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod reports;
pub mod schema;
pub mod sla;
pub mod tickets;

pub use crate::error::{HelpdeskError, Result};
