// storage/src/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use models::{
    Admin, Appointment, Assistant, Disease, DiseaseWithDoctor, Doctor, NewAppointment,
    NewAssistant, NewDisease, NewDoctor, NewPatient, Patient, PatientSummary,
    DOCTOR_DAILY_CAPACITY, STATUS_PENDING,
};

use crate::{ClinicStore, StoreError};

const SCHEMA: &str = include_str!("../schema.sql");

/// PostgreSQL-backed store. Clones share the underlying pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!(max_connections, "connected to postgres");
        Ok(Self { pool })
    }

    /// Applies the idempotent bootstrap schema.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

fn day_lock_key(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
impl ClinicStore for PgStore {
    async fn create_patient(&self, patient: NewPatient) -> Result<i32, StoreError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO patients \
             (full_name, cni, email, phone_number, health_problem, doctor_name, city, age, gender, password) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id",
        )
        .bind(&patient.full_name)
        .bind(&patient.cni)
        .bind(&patient.email)
        .bind(&patient.phone_number)
        .bind(patient.health_problem)
        .bind(&patient.doctor_name)
        .bind(&patient.city)
        .bind(patient.age)
        .bind(&patient.gender)
        .bind(&patient.password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::AlreadyExists("email or cni")
            } else {
                StoreError::from(e)
            }
        })?;
        Ok(id)
    }

    async fn get_patient(&self, id: i32) -> Result<Option<Patient>, StoreError> {
        let patient = sqlx::query_as::<_, Patient>(
            "SELECT id, full_name, cni, email, phone_number, health_problem, doctor_name, \
             city, age, gender, password, created_at, updated_at \
             FROM patients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(patient)
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError> {
        let patient = sqlx::query_as::<_, Patient>(
            "SELECT id, full_name, cni, email, phone_number, health_problem, doctor_name, \
             city, age, gender, password, created_at, updated_at \
             FROM patients WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(patient)
    }

    async fn list_patients(&self) -> Result<Vec<PatientSummary>, StoreError> {
        let rows = sqlx::query_as::<_, PatientSummary>(
            "SELECT id, full_name, doctor_name, health_problem FROM patients ORDER BY full_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError> {
        let doctor = sqlx::query_as::<_, Doctor>(
            "INSERT INTO doctors (name, specialization, contact_info) \
             VALUES ($1, $2, $3) \
             RETURNING id, name, specialization, contact_info, created_at, updated_at",
        )
        .bind(&doctor.name)
        .bind(&doctor.specialization)
        .bind(&doctor.contact_info)
        .fetch_one(&self.pool)
        .await?;
        Ok(doctor)
    }

    async fn get_doctor(&self, id: i32) -> Result<Option<Doctor>, StoreError> {
        let doctor = sqlx::query_as::<_, Doctor>(
            "SELECT id, name, specialization, contact_info, created_at, updated_at \
             FROM doctors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(doctor)
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let doctors = sqlx::query_as::<_, Doctor>(
            "SELECT id, name, specialization, contact_info, created_at, updated_at \
             FROM doctors ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(doctors)
    }

    async fn update_doctor(
        &self,
        id: i32,
        doctor: NewDoctor,
    ) -> Result<Option<Doctor>, StoreError> {
        let doctor = sqlx::query_as::<_, Doctor>(
            "UPDATE doctors \
             SET name = $1, specialization = $2, contact_info = $3, updated_at = NOW() \
             WHERE id = $4 \
             RETURNING id, name, specialization, contact_info, created_at, updated_at",
        )
        .bind(&doctor.name)
        .bind(&doctor.specialization)
        .bind(&doctor.contact_info)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(doctor)
    }

    async fn delete_doctor(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_assistant(&self, assistant: NewAssistant) -> Result<Assistant, StoreError> {
        let assistant = sqlx::query_as::<_, Assistant>(
            "INSERT INTO assistants (name, password) VALUES ($1, $2) \
             RETURNING id, name, password",
        )
        .bind(&assistant.name)
        .bind(&assistant.password)
        .fetch_one(&self.pool)
        .await?;
        Ok(assistant)
    }

    async fn list_assistants(&self) -> Result<Vec<Assistant>, StoreError> {
        let assistants =
            sqlx::query_as::<_, Assistant>("SELECT id, name, password FROM assistants ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(assistants)
    }

    async fn update_assistant(
        &self,
        id: i32,
        assistant: NewAssistant,
    ) -> Result<Option<Assistant>, StoreError> {
        let assistant = sqlx::query_as::<_, Assistant>(
            "UPDATE assistants SET name = $1, password = $2, updated_at = NOW() \
             WHERE id = $3 \
             RETURNING id, name, password",
        )
        .bind(&assistant.name)
        .bind(&assistant.password)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(assistant)
    }

    async fn delete_assistant(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM assistants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_disease(&self, disease: NewDisease) -> Result<Disease, StoreError> {
        let disease = sqlx::query_as::<_, Disease>(
            "INSERT INTO diseases (name, doctor_id) VALUES ($1, $2) \
             RETURNING id, name, doctor_id",
        )
        .bind(&disease.name)
        .bind(disease.doctor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::AlreadyExists("disease name")
            } else {
                StoreError::from(e)
            }
        })?;
        Ok(disease)
    }

    async fn list_diseases(&self) -> Result<Vec<DiseaseWithDoctor>, StoreError> {
        let diseases = sqlx::query_as::<_, DiseaseWithDoctor>(
            "SELECT d.id, d.name, d.doctor_id, doc.name AS doctor_name \
             FROM diseases d \
             LEFT JOIN doctors doc ON d.doctor_id = doc.id \
             ORDER BY d.name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(diseases)
    }

    async fn update_disease(
        &self,
        id: i32,
        disease: NewDisease,
    ) -> Result<Option<Disease>, StoreError> {
        let disease = sqlx::query_as::<_, Disease>(
            "UPDATE diseases SET name = $1, doctor_id = $2, updated_at = NOW() \
             WHERE id = $3 \
             RETURNING id, name, doctor_id",
        )
        .bind(&disease.name)
        .bind(disease.doctor_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(disease)
    }

    async fn delete_disease(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM diseases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn book_appointment(&self, booking: NewAppointment) -> Result<Appointment, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serialize all bookings touching this doctor-date. Held until
        // commit or rollback, so the count-then-insert below is atomic with
        // respect to other bookings for the same slot pool.
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(booking.doctor_id)
            .bind(day_lock_key(booking.appointment_date))
            .execute(&mut *tx)
            .await?;

        let patient_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE patient_id = $1 AND appointment_date = $2",
        )
        .bind(booking.patient_id)
        .bind(booking.appointment_date)
        .fetch_one(&mut *tx)
        .await?;
        if patient_count > 0 {
            return Err(StoreError::DuplicateBooking(booking.appointment_date));
        }

        let doctor_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE doctor_id = $1 AND appointment_date = $2",
        )
        .bind(booking.doctor_id)
        .bind(booking.appointment_date)
        .fetch_one(&mut *tx)
        .await?;
        if doctor_count >= DOCTOR_DAILY_CAPACITY {
            return Err(StoreError::SlotsExhausted(booking.appointment_date));
        }

        let appointment = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (patient_id, doctor_id, appointment_date, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, patient_id, doctor_id, appointment_date, status, created_at, updated_at",
        )
        .bind(booking.patient_id)
        .bind(booking.doctor_id)
        .bind(booking.appointment_date)
        .bind(STATUS_PENDING)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            // The patient-day unique index catches the same patient racing
            // two doctors; the advisory lock only covers one doctor's pool.
            if is_unique_violation(&e) {
                StoreError::DuplicateBooking(booking.appointment_date)
            } else {
                StoreError::from(e)
            }
        })?;

        tx.commit().await?;
        Ok(appointment)
    }

    async fn appointment_counts(
        &self,
        doctor_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<NaiveDate, i64>, StoreError> {
        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            "SELECT appointment_date, COUNT(*) FROM appointments \
             WHERE doctor_id = $1 AND appointment_date >= $2 AND appointment_date <= $3 \
             GROUP BY appointment_date",
        )
        .bind(doctor_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, username, password, created_at FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn upsert_admin(&self, username: &str, password_hash: &str) -> Result<i32, StoreError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO admins (username, password) VALUES ($1, $2) \
             ON CONFLICT (username) DO UPDATE SET password = EXCLUDED.password \
             RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}
