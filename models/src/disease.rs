// models/src/disease.rs

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::patient::{require, require_id};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "postgres-rows", derive(sqlx::FromRow))]
pub struct Disease {
    pub id: i32,
    pub name: String,
    pub doctor_id: i32,
}

/// Disease joined to the owning doctor's display name, as the listing
/// endpoint returns it. The doctor name is optional because the join is a
/// LEFT JOIN; a dangling reference still lists the disease.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "postgres-rows", derive(sqlx::FromRow))]
pub struct DiseaseWithDoctor {
    pub id: i32,
    pub name: String,
    pub doctor_id: i32,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiseaseRequest {
    pub name: Option<String>,
    pub doctor_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewDisease {
    pub name: String,
    pub doctor_id: i32,
}

impl CreateDiseaseRequest {
    pub fn validate(&self) -> Result<NewDisease, ValidationError> {
        Ok(NewDisease {
            name: require(&self.name, "name")?.to_string(),
            doctor_id: require_id(self.doctor_id, "doctorId")?,
        })
    }
}
