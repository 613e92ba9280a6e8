// models/src/patient.rs

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

// Field patterns carried over from the registration form contract.
static CNI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2}[0-9A-Za-z]+$").expect("cni pattern"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{8,10}$").expect("phone pattern"));

const PASSWORD_SPECIALS: &str = "@$!%*?&";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "postgres-rows", derive(sqlx::FromRow))]
pub struct Patient {
    pub id: i32,
    pub full_name: String,
    pub cni: String,
    pub email: String,
    pub phone_number: String,
    pub health_problem: i32,
    pub doctor_name: String,
    pub city: String,
    pub age: i32,
    pub gender: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row for the assistant dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "postgres-rows", derive(sqlx::FromRow))]
pub struct PatientSummary {
    pub id: i32,
    pub full_name: String,
    pub doctor_name: String,
    pub health_problem: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub full_name: Option<String>,
    pub cni: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub health_problem: Option<i32>,
    pub doctor_name: Option<String>,
    pub city: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub password: Option<String>,
}

/// A validated registration. `password` is still the raw secret; callers
/// hash it before it reaches a store.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub full_name: String,
    pub cni: String,
    pub email: String,
    pub phone_number: String,
    pub health_problem: i32,
    pub doctor_name: String,
    pub city: String,
    pub age: i32,
    pub gender: String,
    pub password: String,
}

impl CreatePatientRequest {
    pub fn validate(&self) -> Result<NewPatient, ValidationError> {
        let full_name = require(&self.full_name, "fullName")?;
        let cni = require(&self.cni, "cni")?;
        let email = require(&self.email, "email")?;
        let phone_number = require(&self.phone_number, "phoneNumber")?;
        let doctor_name = require(&self.doctor_name, "doctorName")?;
        let city = require(&self.city, "city")?;
        let gender = require(&self.gender, "gender")?;
        let password = require(&self.password, "password")?;
        let health_problem = require_id(self.health_problem, "healthProblem")?;

        if !CNI_RE.is_match(cni) {
            return Err(ValidationError::InvalidCni);
        }
        if !PHONE_RE.is_match(phone_number) {
            return Err(ValidationError::InvalidPhone);
        }
        let age = match self.age {
            Some(age) if (1..=130).contains(&age) => age,
            Some(_) => return Err(ValidationError::InvalidAge),
            None => return Err(ValidationError::MissingField("age")),
        };
        if !password_is_strong(password) {
            return Err(ValidationError::WeakPassword);
        }

        Ok(NewPatient {
            full_name: full_name.to_string(),
            cni: cni.to_string(),
            email: email.to_string(),
            phone_number: phone_number.to_string(),
            health_problem,
            doctor_name: doctor_name.to_string(),
            city: city.to_string(),
            age,
            gender: gender.to_string(),
            password: password.to_string(),
        })
    }
}

pub(crate) fn require<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

pub(crate) fn require_id(value: Option<i32>, field: &'static str) -> Result<i32, ValidationError> {
    match value {
        Some(v) if v > 0 => Ok(v),
        Some(_) => Err(ValidationError::InvalidId { field }),
        None => Err(ValidationError::MissingField(field)),
    }
}

fn password_is_strong(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c))
}
