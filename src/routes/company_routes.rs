// src/routes/company_routes.rs

use axum::{
    extract::State,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{AppState, CompanyProfile, CompanyRow},
    schedule::slots::slot_universe,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/company", get(get_company).patch(update_company))
        .route("/company/time-slots", get(get_time_slots))
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub data: CompanyProfile,
}

async fn load_company(state: &AppState, company_id: uuid::Uuid) -> Result<CompanyRow, ApiError> {
    sqlx::query_as::<_, CompanyRow>(
        r#"
        SELECT company_id, name, email, address, phone, times, status, timezone,
               created_at, updated_at
        FROM company
        WHERE company_id = $1
        "#,
    )
    .bind(company_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "company not found".into()))
}

pub async fn get_company(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<CompanyResponse>, ApiError> {
    let company = load_company(&state, auth.company_id).await?;
    Ok(Json(CompanyResponse {
        data: company.profile(),
    }))
}

/* ============================================================
   PATCH /company — profile incl. opening hours
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub status: Option<bool>,
    pub timezone: Option<String>,
    /// Replaces the whole opening-hours selection when present.
    pub times: Option<Vec<String>>,
}

/// Canonicalize a toggled selection against the generated universe:
/// membership check, de-dup, and universe (chronological) order.
fn normalize_times(selected: &[String]) -> Result<Vec<String>, ApiError> {
    let universe = slot_universe();
    let known: HashSet<&str> = universe.iter().map(String::as_str).collect();

    if let Some(bad) = selected.iter().find(|t| !known.contains(t.as_str())) {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            format!("'{bad}' is not a valid opening-hours slot"),
        ));
    }

    let chosen: HashSet<&str> = selected.iter().map(String::as_str).collect();
    Ok(universe
        .into_iter()
        .filter(|t| chosen.contains(t.as_str()))
        .collect())
}

pub async fn update_company(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<Json<CompanyResponse>, ApiError> {
    if let Some(name) = req.name.as_deref() {
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "VALIDATION_ERROR",
                "name must not be empty".into(),
            ));
        }
    }

    let times = match req.times.as_deref() {
        Some(selected) => Some(normalize_times(selected)?),
        None => None,
    };

    let company: CompanyRow = sqlx::query_as(
        r#"
        UPDATE company
        SET
          name     = COALESCE($2, name),
          address  = COALESCE($3, address),
          phone    = COALESCE($4, phone),
          status   = COALESCE($5, status),
          timezone = COALESCE($6, timezone),
          times    = COALESCE($7, times),
          updated_at = now()
        WHERE company_id = $1
        RETURNING company_id, name, email, address, phone, times, status, timezone,
                  created_at, updated_at
        "#,
    )
    .bind(auth.company_id)
    .bind(req.name.as_deref().map(str::trim))
    .bind(req.address)
    .bind(req.phone)
    .bind(req.status)
    .bind(req.timezone)
    .bind(times)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(CompanyResponse {
        data: company.profile(),
    }))
}

/* ============================================================
   GET /company/time-slots — picker data for the profile form
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct TimeSlotsResponse {
    pub data: TimeSlotsData,
}

#[derive(Debug, Serialize)]
pub struct TimeSlotsData {
    /// The full generated universe, 07:00..23:30.
    pub all: Vec<String>,
    /// The company's current selection.
    pub selected: Vec<String>,
}

pub async fn get_time_slots(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<TimeSlotsResponse>, ApiError> {
    let company = load_company(&state, auth.company_id).await?;
    Ok(Json(TimeSlotsResponse {
        data: TimeSlotsData {
            all: slot_universe(),
            selected: company.times,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::normalize_times;

    #[test]
    fn selection_is_deduped_and_reordered() {
        let selected = vec![
            "09:30".to_string(),
            "07:00".to_string(),
            "09:30".to_string(),
        ];
        let normalized = normalize_times(&selected).expect("valid selection");
        assert_eq!(normalized, vec!["07:00", "09:30"]);
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!(normalize_times(&["06:15".to_string()]).is_err());
        assert!(normalize_times(&["24:00".to_string()]).is_err());
    }

    #[test]
    fn empty_selection_is_allowed() {
        // a company may close all hours; bookings then always fail validation
        assert_eq!(normalize_times(&[]).unwrap(), Vec::<String>::new());
    }
}
