// models/src/appointment.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::patient::require_id;

/// Maximum appointments one doctor can hold on a single calendar date.
pub const DOCTOR_DAILY_CAPACITY: i64 = 10;

pub const STATUS_PENDING: &str = "Pending";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "postgres-rows", derive(sqlx::FromRow))]
pub struct Appointment {
    pub id: i32,
    pub patient_id: i32,
    pub doctor_id: i32,
    pub appointment_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub patient_id: Option<i32>,
    pub doctor_id: Option<i32>,
    pub appointment_date: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewAppointment {
    pub patient_id: i32,
    pub doctor_id: i32,
    pub appointment_date: NaiveDate,
}

impl BookAppointmentRequest {
    pub fn validate(&self) -> Result<NewAppointment, ValidationError> {
        let patient_id = require_id(self.patient_id, "patientId")?;
        let doctor_id = require_id(self.doctor_id, "doctorId")?;
        let raw_date = self
            .appointment_date
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ValidationError::MissingField("appointmentDate"))?;
        let appointment_date = parse_appointment_date(raw_date)?;

        Ok(NewAppointment {
            patient_id,
            doctor_id,
            appointment_date,
        })
    }
}

/// Accepts the calendar-date form the booking form sends, plus full RFC 3339
/// timestamps from older front-end builds (truncated to their date part).
pub fn parse_appointment_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.date_naive())
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}
