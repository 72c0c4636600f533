use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub session_ttl_hours: i64,
}

/* -------------------------
   API DTOs
--------------------------*/

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub data: LoginResponseData,
}

#[derive(Debug, Serialize)]
pub struct LoginResponseData {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub company: CompanyProfile,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub data: MeResponseData,
}

#[derive(Debug, Serialize)]
pub struct MeResponseData {
    pub company: CompanyProfile,
    pub session: SessionInfo,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub data: OkData,
}

#[derive(Debug, Serialize)]
pub struct OkData {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct CompanyProfile {
    pub company_id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub times: Vec<String>,
    pub status: bool,
    pub timezone: String,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub session_token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CompanyRow {
    pub company_id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Ordered subset of the slot universe this company operates during.
    pub times: Vec<String>,
    /// false = closed for bookings.
    pub status: bool,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct CompanyAuthRow {
    pub company_id: Uuid,
    pub password_hash: String,
}

#[derive(Debug, FromRow)]
pub struct SessionTokenRow {
    pub session_token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceRow {
    pub service_id: Uuid,
    pub company_id: Uuid,
    pub display_name: String,
    pub duration_min: i32,
    pub price_cents: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppointmentRow {
    pub appointment_id: Uuid,
    pub company_id: Uuid,
    pub service_id: Uuid,
    pub client_id: Uuid,
    /// Plain calendar day; no time-of-day, no zone. The start slot lives in
    /// `time` as a "HH:MM" label.
    pub appointment_date: NaiveDate,
    pub time: String,
    pub created_at: DateTime<Utc>,
}

impl CompanyRow {
    pub fn profile(&self) -> CompanyProfile {
        CompanyProfile {
            company_id: self.company_id,
            name: self.name.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            times: self.times.clone(),
            status: self.status,
            timezone: self.timezone.clone(),
        }
    }
}
