// src/routes/appointment_routes.rs
//
// Admin day view and cancellation. Appointments are immutable after
// creation; cancelling is a hard delete, never an update.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{AppState, OkData, OkResponse},
    schedule::occupancy::{AppointmentSpan, DayOccupancy},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments/day", get(get_day_schedule))
        .route("/appointments/{appointment_id}", delete(cancel_appointment))
}

/* ============================================================
   GET /appointments/day?date=<yyyy-MM-dd>
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct DayScheduleResponse {
    pub data: DayScheduleData,
}

#[derive(Debug, Serialize)]
pub struct DayScheduleData {
    pub date: NaiveDate,
    pub slots: Vec<DaySlotDto>,
}

/// One opening-hours slot with whoever occupies it; every slot of a
/// multi-slot appointment points at the same booking.
#[derive(Debug, Serialize)]
pub struct DaySlotDto {
    pub time: String,
    pub appointment: Option<BookedSlotDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookedSlotDto {
    pub appointment_id: Uuid,
    pub start: String,
    pub service_name: String,
    pub duration_min: i32,
    pub client_name: String,
    pub client_phone: String,
}

#[derive(Debug, sqlx::FromRow)]
struct DayAppointmentRow {
    appointment_id: Uuid,
    time: String,
    duration_min: i32,
    service_name: String,
    client_name: String,
    client_phone: String,
}

pub async fn get_day_schedule(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(q): Query<DayQuery>,
) -> Result<Json<DayScheduleResponse>, ApiError> {
    let date = NaiveDate::parse_from_str(q.date.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest("VALIDATION_ERROR", "date must be yyyy-MM-dd".into())
    })?;

    let times: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT times
        FROM company
        WHERE company_id = $1
        "#,
    )
    .bind(auth.company_id)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::db)?;

    let rows: Vec<DayAppointmentRow> = sqlx::query_as(
        r#"
        SELECT a.appointment_id, a.time, s.duration_min,
               s.display_name AS service_name,
               c.name AS client_name, c.phone AS client_phone
        FROM appointment a
        JOIN service s ON s.service_id = a.service_id
        JOIN client c ON c.client_id = a.client_id
        WHERE a.company_id = $1 AND a.appointment_date = $2
        "#,
    )
    .bind(auth.company_id)
    .bind(date)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    let spans: Vec<AppointmentSpan> = rows
        .iter()
        .map(|r| AppointmentSpan {
            appointment_id: r.appointment_id,
            start: r.time.clone(),
            duration_min: r.duration_min,
        })
        .collect();

    let details: HashMap<Uuid, BookedSlotDto> = rows
        .into_iter()
        .map(|r| {
            (
                r.appointment_id,
                BookedSlotDto {
                    appointment_id: r.appointment_id,
                    start: r.time,
                    service_name: r.service_name,
                    duration_min: r.duration_min,
                    client_name: r.client_name,
                    client_phone: r.client_phone,
                },
            )
        })
        .collect();

    let occupancy = DayOccupancy::build(&times, &spans);
    let slots = times
        .iter()
        .map(|label| DaySlotDto {
            time: label.clone(),
            appointment: occupancy
                .occupant(label)
                .and_then(|id| details.get(&id).cloned()),
        })
        .collect();

    Ok(Json(DayScheduleResponse {
        data: DayScheduleData { date, slots },
    }))
}

/* ============================================================
   DELETE /appointments/{appointment_id}
   ============================================================ */

pub async fn cancel_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<OkResponse>, ApiError> {
    let deleted: Option<Uuid> = sqlx::query_scalar(
        r#"
        DELETE FROM appointment
        WHERE appointment_id = $1 AND company_id = $2
        RETURNING appointment_id
        "#,
    )
    .bind(appointment_id)
    .bind(auth.company_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?;

    if deleted.is_none() {
        return Err(ApiError::NotFound("NOT_FOUND", "appointment not found".into()));
    }

    Ok(Json(OkResponse {
        data: OkData { ok: true },
    }))
}
