// models/src/assistant.rs

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::patient::require;

// Assistant credentials are stored as given; the reception desk accounts
// predate the hashed-credential scheme used for patients and admins.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "postgres-rows", derive(sqlx::FromRow))]
pub struct Assistant {
    pub id: i32,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistantRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAssistant {
    pub name: String,
    pub password: String,
}

impl CreateAssistantRequest {
    pub fn validate(&self) -> Result<NewAssistant, ValidationError> {
        Ok(NewAssistant {
            name: require(&self.name, "name")?.to_string(),
            password: require(&self.password, "password")?.to_string(),
        })
    }
}
