pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use models::{
    Admin, Appointment, Assistant, Disease, DiseaseWithDoctor, Doctor, NewAppointment,
    NewAssistant, NewDisease, NewDoctor, NewPatient, Patient, PatientSummary,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("patient already has an appointment on {0}")]
    DuplicateBooking(NaiveDate),
    #[error("doctor has no free slots left on {0}")]
    SlotsExhausted(NaiveDate),
    #[error("{0} is already registered")]
    AlreadyExists(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for the clinic. `PgStore` is the production
/// implementation; `MemoryStore` backs the API test suite.
#[async_trait]
pub trait ClinicStore: Send + Sync + 'static {
    async fn create_patient(&self, patient: NewPatient) -> Result<i32, StoreError>;
    async fn get_patient(&self, id: i32) -> Result<Option<Patient>, StoreError>;
    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError>;
    async fn list_patients(&self) -> Result<Vec<PatientSummary>, StoreError>;

    async fn create_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError>;
    async fn get_doctor(&self, id: i32) -> Result<Option<Doctor>, StoreError>;
    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError>;
    async fn update_doctor(&self, id: i32, doctor: NewDoctor)
        -> Result<Option<Doctor>, StoreError>;
    async fn delete_doctor(&self, id: i32) -> Result<bool, StoreError>;

    async fn create_assistant(&self, assistant: NewAssistant) -> Result<Assistant, StoreError>;
    async fn list_assistants(&self) -> Result<Vec<Assistant>, StoreError>;
    async fn update_assistant(
        &self,
        id: i32,
        assistant: NewAssistant,
    ) -> Result<Option<Assistant>, StoreError>;
    async fn delete_assistant(&self, id: i32) -> Result<bool, StoreError>;

    async fn create_disease(&self, disease: NewDisease) -> Result<Disease, StoreError>;
    async fn list_diseases(&self) -> Result<Vec<DiseaseWithDoctor>, StoreError>;
    async fn update_disease(
        &self,
        id: i32,
        disease: NewDisease,
    ) -> Result<Option<Disease>, StoreError>;
    async fn delete_disease(&self, id: i32) -> Result<bool, StoreError>;

    /// Creates a Pending appointment iff the patient is free that date and
    /// the doctor is under capacity, atomically with respect to concurrent
    /// bookings for the same doctor-date or patient-date.
    async fn book_appointment(&self, booking: NewAppointment) -> Result<Appointment, StoreError>;

    /// Per-date appointment counts for one doctor over an inclusive range.
    /// Dates without appointments are absent from the map.
    async fn appointment_counts(
        &self,
        doctor_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<NaiveDate, i64>, StoreError>;

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError>;

    /// Creates or refreshes an admin account at startup. `password_hash` is
    /// expected to already be hashed.
    async fn upsert_admin(&self, username: &str, password_hash: &str) -> Result<i32, StoreError>;
}
