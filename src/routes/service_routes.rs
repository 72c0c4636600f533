// src/routes/service_routes.rs

use axum::{extract::State, routing::get, Json, Router};

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{AppState, ServiceRow},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_services))
}

/// Active services for the authenticated company. Read-only; service CRUD
/// lives outside this core.
pub async fn list_services(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<ServiceRow>>, ApiError> {
    let rows: Vec<ServiceRow> = sqlx::query_as::<_, ServiceRow>(
        r#"
        SELECT service_id, company_id, display_name, duration_min, price_cents,
               is_active, created_at, updated_at
        FROM service
        WHERE company_id = $1 AND is_active = true
        ORDER BY display_name ASC
        "#,
    )
    .bind(auth.company_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(rows))
}
