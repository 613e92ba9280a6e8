// models/src/doctor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::patient::require;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "postgres-rows", derive(sqlx::FromRow))]
pub struct Doctor {
    pub id: i32,
    pub name: String,
    pub specialization: String,
    pub contact_info: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub name: String,
    pub specialization: String,
    pub contact_info: String,
}

impl CreateDoctorRequest {
    pub fn validate(&self) -> Result<NewDoctor, ValidationError> {
        Ok(NewDoctor {
            name: require(&self.name, "name")?.to_string(),
            specialization: require(&self.specialization, "specialization")?.to_string(),
            contact_info: require(&self.contact_info, "contactInfo")?.to_string(),
        })
    }
}
