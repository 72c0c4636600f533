use crate::models::AppState;
use axum::Router;

pub mod appointment_routes;
pub mod auth_routes;
pub mod company_routes;
pub mod schedule_routes;
pub mod service_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        // public booking surface
        .nest("/api/schedule", schedule_routes::router())
        // admin dashboard
        .nest("/api/v1/auth", auth_routes::router())
        .nest("/api/v1/services", service_routes::router())
        .nest("/api/v1", company_routes::router())
        .nest("/api/v1", appointment_routes::router())
        .with_state(state)
}
