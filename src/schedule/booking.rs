// src/schedule/booking.rs

use chrono::{DateTime, Local, NaiveDate};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::AppointmentRow;

use super::availability::is_slot_sequence_available;
use super::occupancy::{AppointmentSpan, DayOccupancy};
use super::slots::{is_today, slot_in_past, slots_required};

/// Public booking payload. Every field defaults to empty so that a missing
/// field fails request validation (returned as `{ error }`) instead of
/// failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// yyyy-MM-dd, or an RFC 3339 timestamp whose date portion is used.
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "serviceId")]
    pub service_id: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, rename = "companyId", alias = "empresaId")]
    pub company_id: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,
    #[error("a valid email is required")]
    InvalidEmail,
    #[error("phone is required")]
    MissingPhone,
    #[error("date must be yyyy-MM-dd")]
    InvalidDate,
    #[error("time is required")]
    MissingTime,
    #[error("{0} id is invalid")]
    InvalidId(&'static str),
}

/// Outcome of a booking attempt. Infrastructure failures travel separately
/// as `sqlx::Error`; a lost write-time race surfaces here as
/// `SlotUnavailable`, identical to a pre-check rejection.
#[derive(Debug)]
pub enum BookingResult {
    Accepted(AppointmentRow),
    SlotUnavailable,
    ValidationFailed(String),
}

/// A request that passed shape validation: ids parsed, date normalized to a
/// plain calendar day, text fields trimmed.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidBooking {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub appointment_date: NaiveDate,
    pub service_id: Uuid,
    pub time: String,
    pub company_id: Uuid,
}

/// Normalize a submitted date to a calendar day, no time-of-day, no zone.
/// Timestamps are collapsed to the calendar date of their own offset so
/// that the stored day matches what the client picked.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

pub fn validate_request(req: &BookingRequest) -> Result<ValidBooking, ValidationError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    let email = req.email.trim();
    if !is_plausible_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    let phone = req.phone.trim();
    if phone.is_empty() {
        return Err(ValidationError::MissingPhone);
    }
    let appointment_date = parse_calendar_date(&req.date).ok_or(ValidationError::InvalidDate)?;
    if req.time.trim().is_empty() {
        return Err(ValidationError::MissingTime);
    }
    let service_id = Uuid::parse_str(req.service_id.trim())
        .map_err(|_| ValidationError::InvalidId("service"))?;
    let company_id = Uuid::parse_str(req.company_id.trim())
        .map_err(|_| ValidationError::InvalidId("company"))?;

    Ok(ValidBooking {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        appointment_date,
        service_id,
        time: req.time.trim().to_string(),
        company_id,
    })
}

#[derive(Debug, sqlx::FromRow)]
struct CompanyScheduleRow {
    times: Vec<String>,
    status: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct SpanRow {
    appointment_id: Uuid,
    time: String,
    duration_min: i32,
}

/// The write path. Resolves the client, re-validates availability against
/// current occupancy and inserts, all inside one transaction.
///
/// The `FOR UPDATE` on the company row serializes booking attempts per
/// company, so the re-validate happens against committed occupancy and two
/// concurrent requests for overlapping runs cannot both pass. The unique
/// constraint on (company_id, appointment_date, time) backstops the same
/// guarantee at the storage layer; a violation is reported as
/// `SlotUnavailable`, never as an infrastructure error.
pub async fn book_appointment(
    pool: &PgPool,
    req: &BookingRequest,
) -> Result<BookingResult, sqlx::Error> {
    let booking = match validate_request(req) {
        Ok(b) => b,
        Err(e) => return Ok(BookingResult::ValidationFailed(e.to_string())),
    };

    let mut tx = pool.begin().await?;

    let company: Option<CompanyScheduleRow> = sqlx::query_as(
        r#"
        SELECT times, status
        FROM company
        WHERE company_id = $1
        FOR UPDATE
        "#,
    )
    .bind(booking.company_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(company) = company else {
        return Ok(BookingResult::ValidationFailed("company not found".into()));
    };
    if !company.status {
        return Ok(BookingResult::ValidationFailed(
            "company is not accepting bookings".into(),
        ));
    }

    let duration_min: Option<i32> = sqlx::query_scalar(
        r#"
        SELECT duration_min
        FROM service
        WHERE service_id = $1 AND company_id = $2 AND is_active = true
        "#,
    )
    .bind(booking.service_id)
    .bind(booking.company_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(duration_min) = duration_min else {
        return Ok(BookingResult::ValidationFailed("service not found".into()));
    };
    let required = slots_required(duration_min);

    // A stale client can submit a slot that elapsed while the page was open;
    // re-check the wall clock here, on today's date only.
    let now = Local::now().naive_local();
    if is_today(booking.appointment_date, now) && slot_in_past(&booking.time, now.time()) {
        return Ok(BookingResult::SlotUnavailable);
    }

    let spans: Vec<SpanRow> = sqlx::query_as(
        r#"
        SELECT a.appointment_id, a.time, s.duration_min
        FROM appointment a
        JOIN service s ON s.service_id = a.service_id
        WHERE a.company_id = $1 AND a.appointment_date = $2
        "#,
    )
    .bind(booking.company_id)
    .bind(booking.appointment_date)
    .fetch_all(&mut *tx)
    .await?;

    let spans: Vec<AppointmentSpan> = spans
        .into_iter()
        .map(|r| AppointmentSpan {
            appointment_id: r.appointment_id,
            start: r.time,
            duration_min: r.duration_min,
        })
        .collect();

    let occupancy = DayOccupancy::build(&company.times, &spans);
    if !is_slot_sequence_available(&booking.time, required, &company.times, occupancy.blocked_set())
    {
        return Ok(BookingResult::SlotUnavailable);
    }

    // Resolve the client by (company, email); same email re-books against
    // the existing row, whatever name was submitted this time.
    let client_id: Option<Uuid> = sqlx::query_scalar(
        r#"
        SELECT client_id
        FROM client
        WHERE company_id = $1 AND email = $2
        "#,
    )
    .bind(booking.company_id)
    .bind(&booking.email)
    .fetch_optional(&mut *tx)
    .await?;

    let client_id = match client_id {
        Some(id) => id,
        None => {
            sqlx::query_scalar(
                r#"
                INSERT INTO client (company_id, name, email, phone)
                VALUES ($1, $2, $3, $4)
                RETURNING client_id
                "#,
            )
            .bind(booking.company_id)
            .bind(&booking.name)
            .bind(&booking.email)
            .bind(&booking.phone)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    let inserted = sqlx::query_as::<_, AppointmentRow>(
        r#"
        INSERT INTO appointment (company_id, service_id, client_id, appointment_date, time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING appointment_id, company_id, service_id, client_id,
                  appointment_date, time, created_at
        "#,
    )
    .bind(booking.company_id)
    .bind(booking.service_id)
    .bind(client_id)
    .bind(booking.appointment_date)
    .bind(&booking.time)
    .fetch_one(&mut *tx)
    .await;

    let appointment = match inserted {
        Ok(row) => row,
        Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            return Ok(BookingResult::SlotUnavailable);
        }
        Err(e) => return Err(e),
    };

    tx.commit().await?;
    Ok(BookingResult::Accepted(appointment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> BookingRequest {
        BookingRequest {
            name: "Maria Souza".into(),
            email: "maria@example.com".into(),
            phone: "11999990000".into(),
            date: "2026-09-01".into(),
            service_id: Uuid::new_v4().to_string(),
            time: "15:00".into(),
            company_id: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn accepts_a_well_formed_request() {
        let req = valid_request();
        let booking = validate_request(&req).expect("must validate");
        assert_eq!(booking.time, "15:00");
        assert_eq!(
            booking.appointment_date,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
        );
    }

    #[test]
    fn rejects_each_missing_field() {
        let mut req = valid_request();
        req.name = "   ".into();
        assert_eq!(validate_request(&req), Err(ValidationError::MissingName));

        let mut req = valid_request();
        req.email = "not-an-email".into();
        assert_eq!(validate_request(&req), Err(ValidationError::InvalidEmail));

        let mut req = valid_request();
        req.phone = String::new();
        assert_eq!(validate_request(&req), Err(ValidationError::MissingPhone));

        let mut req = valid_request();
        req.date = "01/09/2026".into();
        assert_eq!(validate_request(&req), Err(ValidationError::InvalidDate));

        let mut req = valid_request();
        req.time = String::new();
        assert_eq!(validate_request(&req), Err(ValidationError::MissingTime));

        let mut req = valid_request();
        req.service_id = "svc-123".into();
        assert_eq!(
            validate_request(&req),
            Err(ValidationError::InvalidId("service"))
        );

        let mut req = valid_request();
        req.company_id = String::new();
        assert_eq!(
            validate_request(&req),
            Err(ValidationError::InvalidId("company"))
        );
    }

    #[test]
    fn calendar_date_accepts_plain_and_rfc3339() {
        let day = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert_eq!(parse_calendar_date("2026-09-01"), Some(day));
        // the date is taken in the timestamp's own offset
        assert_eq!(parse_calendar_date("2026-09-01T22:30:00-03:00"), Some(day));
        assert_eq!(parse_calendar_date(" 2026-09-01 "), Some(day));
        assert_eq!(parse_calendar_date("yesterday"), None);
        assert_eq!(parse_calendar_date(""), None);
    }

    #[test]
    fn validation_errors_render_user_facing_messages() {
        assert_eq!(ValidationError::MissingName.to_string(), "name is required");
        assert_eq!(
            ValidationError::InvalidId("service").to_string(),
            "service id is invalid"
        );
    }
}
