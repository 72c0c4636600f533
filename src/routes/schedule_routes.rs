// src/routes/schedule_routes.rs
//
// Public scheduling surface: no auth, consumed by the booking page and by
// the chatbot webhook before it creates an appointment.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{AppState, AppointmentRow, ServiceRow},
    schedule::booking::{book_appointment, BookingRequest, BookingResult},
    schedule::occupancy::{AppointmentSpan, DayOccupancy},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-appointments", get(get_blocked_times))
        .route("/company/{company_id}", get(get_company_info))
        .route("/appointments", post(create_appointment))
}

/* ============================================================
   GET /api/schedule/get-appointments?userId=<companyId>&date=<yyyy-MM-dd>
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct BlockedTimesQuery {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub date: String,
}

#[derive(Debug, sqlx::FromRow)]
struct SpanRow {
    appointment_id: Uuid,
    time: String,
    duration_min: i32,
}

/// Flat list of blocked slot labels for one company/day, in slot order.
/// The booking page greys these out; the write path re-checks them anyway.
pub async fn get_blocked_times(
    State(state): State<AppState>,
    Query(q): Query<BlockedTimesQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    let date = NaiveDate::parse_from_str(q.date.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest("VALIDATION_ERROR", "date must be yyyy-MM-dd".into())
    })?;

    let times: Option<Vec<String>> = sqlx::query_scalar(
        r#"
        SELECT times
        FROM company
        WHERE company_id = $1
        "#,
    )
    .bind(q.user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?;

    let Some(times) = times else {
        return Err(ApiError::NotFound("NOT_FOUND", "company not found".into()));
    };

    let spans: Vec<SpanRow> = sqlx::query_as(
        r#"
        SELECT a.appointment_id, a.time, s.duration_min
        FROM appointment a
        JOIN service s ON s.service_id = a.service_id
        WHERE a.company_id = $1 AND a.appointment_date = $2
        "#,
    )
    .bind(q.user_id)
    .bind(date)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    let spans: Vec<AppointmentSpan> = spans
        .into_iter()
        .map(|r| AppointmentSpan {
            appointment_id: r.appointment_id,
            start: r.time,
            duration_min: r.duration_min,
        })
        .collect();

    let occupancy = DayOccupancy::build(&times, &spans);
    Ok(Json(occupancy.blocked_labels(&times)))
}

/* ============================================================
   GET /api/schedule/company/{company_id}
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct PublicCompanyResponse {
    pub data: PublicCompanyData,
}

#[derive(Debug, Serialize)]
pub struct PublicCompanyData {
    pub company_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub status: bool,
    pub times: Vec<String>,
    pub services: Vec<PublicServiceData>,
}

#[derive(Debug, Serialize)]
pub struct PublicServiceData {
    pub service_id: Uuid,
    pub display_name: String,
    pub duration_min: i32,
    pub price_cents: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct PublicCompanyRow {
    company_id: Uuid,
    name: String,
    address: Option<String>,
    status: bool,
    times: Vec<String>,
}

/// Everything the public booking page (and the chatbot context) needs to
/// render: opening hours plus the active service list. No auth.
pub async fn get_company_info(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<PublicCompanyResponse>, ApiError> {
    let company: PublicCompanyRow = sqlx::query_as(
        r#"
        SELECT company_id, name, address, status, times
        FROM company
        WHERE company_id = $1
        "#,
    )
    .bind(company_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "company not found".into()))?;

    let services: Vec<ServiceRow> = sqlx::query_as::<_, ServiceRow>(
        r#"
        SELECT service_id, company_id, display_name, duration_min, price_cents,
               is_active, created_at, updated_at
        FROM service
        WHERE company_id = $1 AND is_active = true
        ORDER BY display_name ASC
        "#,
    )
    .bind(company_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(PublicCompanyResponse {
        data: PublicCompanyData {
            company_id: company.company_id,
            name: company.name,
            address: company.address,
            status: company.status,
            times: company.times,
            services: services
                .into_iter()
                .map(|s| PublicServiceData {
                    service_id: s.service_id,
                    display_name: s.display_name,
                    duration_min: s.duration_min,
                    price_cents: s.price_cents,
                })
                .collect(),
        },
    }))
}

/* ============================================================
   POST /api/schedule/appointments
   ============================================================ */

/// The `{ data } | { error }` contract: domain failures never surface as
/// error statuses to the public form.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BookingResponse {
    Data { data: AppointmentRow },
    Error { error: String },
}

pub async fn create_appointment(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Json<BookingResponse> {
    let Ok(Json(req)) = payload else {
        return Json(BookingResponse::Error {
            error: "invalid request body".into(),
        });
    };

    match book_appointment(&state.db, &req).await {
        Ok(BookingResult::Accepted(appointment)) => {
            Json(BookingResponse::Data { data: appointment })
        }
        Ok(BookingResult::SlotUnavailable) => Json(BookingResponse::Error {
            error: "this time is no longer available".into(),
        }),
        Ok(BookingResult::ValidationFailed(reason)) => {
            Json(BookingResponse::Error { error: reason })
        }
        Err(e) => {
            // infrastructure detail stays in the log, not on the public page
            tracing::error!("booking failed: {e}");
            Json(BookingResponse::Error {
                error: "failed to create appointment".into(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn booking_response_keeps_the_flat_wire_shape() {
        let err = BookingResponse::Error {
            error: "name is required".into(),
        };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "error": "name is required" })
        );

        let row = AppointmentRow {
            appointment_id: Uuid::nil(),
            company_id: Uuid::nil(),
            service_id: Uuid::nil(),
            client_id: Uuid::nil(),
            appointment_date: chrono::NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            time: "15:00".into(),
            created_at: Utc::now(),
        };
        let ok = serde_json::to_value(&BookingResponse::Data { data: row }).unwrap();
        assert_eq!(ok["data"]["time"], "15:00");
        assert!(ok.get("error").is_none());
    }
}
