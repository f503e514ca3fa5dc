use std::sync::Arc;

pub mod application;
pub mod config;
pub mod customer;
pub mod error;
pub mod routes;
pub mod telemetry;

/// Shared by every request; holds no mutable state of its own.
#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<dyn customer::repository::CustomerRepository>,
}

impl AppState {
    pub fn new(customers: Arc<dyn customer::repository::CustomerRepository>) -> Self {
        Self { customers }
    }
}
