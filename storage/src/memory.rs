// storage/src/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;

use models::{
    Admin, Appointment, Assistant, Disease, DiseaseWithDoctor, Doctor, NewAppointment,
    NewAssistant, NewDisease, NewDoctor, NewPatient, Patient, PatientSummary,
    DOCTOR_DAILY_CAPACITY, STATUS_PENDING,
};

use crate::{ClinicStore, StoreError};

#[derive(Default)]
struct Inner {
    patients: Vec<Patient>,
    doctors: Vec<Doctor>,
    assistants: Vec<Assistant>,
    diseases: Vec<Disease>,
    appointments: Vec<Appointment>,
    admins: Vec<Admin>,
    next_id: i32,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process store. Every operation runs under one async mutex, so the
/// booking check-then-insert is serialized the same way the Postgres store
/// serializes it with its per-doctor-date lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClinicStore for MemoryStore {
    async fn create_patient(&self, patient: NewPatient) -> Result<i32, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner
            .patients
            .iter()
            .any(|p| p.email == patient.email || p.cni == patient.cni)
        {
            return Err(StoreError::AlreadyExists("email or cni"));
        }
        let id = inner.next_id();
        let now = Utc::now();
        inner.patients.push(Patient {
            id,
            full_name: patient.full_name,
            cni: patient.cni,
            email: patient.email,
            phone_number: patient.phone_number,
            health_problem: patient.health_problem,
            doctor_name: patient.doctor_name,
            city: patient.city,
            age: patient.age,
            gender: patient.gender,
            password: patient.password,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn get_patient(&self, id: i32) -> Result<Option<Patient>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.patients.iter().find(|p| p.id == id).cloned())
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.patients.iter().find(|p| p.email == email).cloned())
    }

    async fn list_patients(&self) -> Result<Vec<PatientSummary>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .patients
            .iter()
            .map(|p| PatientSummary {
                id: p.id,
                full_name: p.full_name.clone(),
                doctor_name: p.doctor_name.clone(),
                health_problem: p.health_problem,
            })
            .collect())
    }

    async fn create_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        let now = Utc::now();
        let doctor = Doctor {
            id,
            name: doctor.name,
            specialization: doctor.specialization,
            contact_info: doctor.contact_info,
            created_at: now,
            updated_at: now,
        };
        inner.doctors.push(doctor.clone());
        Ok(doctor)
    }

    async fn get_doctor(&self, id: i32) -> Result<Option<Doctor>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.doctors.iter().find(|d| d.id == id).cloned())
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let inner = self.inner.lock().await;
        let mut doctors = inner.doctors.clone();
        doctors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(doctors)
    }

    async fn update_doctor(
        &self,
        id: i32,
        doctor: NewDoctor,
    ) -> Result<Option<Doctor>, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.doctors.iter_mut().find(|d| d.id == id) {
            Some(existing) => {
                existing.name = doctor.name;
                existing.specialization = doctor.specialization;
                existing.contact_info = doctor.contact_info;
                existing.updated_at = Utc::now();
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_doctor(&self, id: i32) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.doctors.len();
        inner.doctors.retain(|d| d.id != id);
        if inner.doctors.len() == before {
            return Ok(false);
        }
        // Mirrors the ON DELETE CASCADE references.
        inner.diseases.retain(|d| d.doctor_id != id);
        inner.appointments.retain(|a| a.doctor_id != id);
        Ok(true)
    }

    async fn create_assistant(&self, assistant: NewAssistant) -> Result<Assistant, StoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        let assistant = Assistant {
            id,
            name: assistant.name,
            password: assistant.password,
        };
        inner.assistants.push(assistant.clone());
        Ok(assistant)
    }

    async fn list_assistants(&self) -> Result<Vec<Assistant>, StoreError> {
        let inner = self.inner.lock().await;
        let mut assistants = inner.assistants.clone();
        assistants.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(assistants)
    }

    async fn update_assistant(
        &self,
        id: i32,
        assistant: NewAssistant,
    ) -> Result<Option<Assistant>, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.assistants.iter_mut().find(|a| a.id == id) {
            Some(existing) => {
                existing.name = assistant.name;
                existing.password = assistant.password;
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_assistant(&self, id: i32) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.assistants.len();
        inner.assistants.retain(|a| a.id != id);
        Ok(inner.assistants.len() != before)
    }

    async fn create_disease(&self, disease: NewDisease) -> Result<Disease, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.diseases.iter().any(|d| d.name == disease.name) {
            return Err(StoreError::AlreadyExists("disease name"));
        }
        let id = inner.next_id();
        let disease = Disease {
            id,
            name: disease.name,
            doctor_id: disease.doctor_id,
        };
        inner.diseases.push(disease.clone());
        Ok(disease)
    }

    async fn list_diseases(&self) -> Result<Vec<DiseaseWithDoctor>, StoreError> {
        let inner = self.inner.lock().await;
        let mut diseases: Vec<DiseaseWithDoctor> = inner
            .diseases
            .iter()
            .map(|d| DiseaseWithDoctor {
                id: d.id,
                name: d.name.clone(),
                doctor_id: d.doctor_id,
                doctor_name: inner
                    .doctors
                    .iter()
                    .find(|doc| doc.id == d.doctor_id)
                    .map(|doc| doc.name.clone()),
            })
            .collect();
        diseases.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(diseases)
    }

    async fn update_disease(
        &self,
        id: i32,
        disease: NewDisease,
    ) -> Result<Option<Disease>, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.diseases.iter_mut().find(|d| d.id == id) {
            Some(existing) => {
                existing.name = disease.name;
                existing.doctor_id = disease.doctor_id;
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_disease(&self, id: i32) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.diseases.len();
        inner.diseases.retain(|d| d.id != id);
        Ok(inner.diseases.len() != before)
    }

    async fn book_appointment(&self, booking: NewAppointment) -> Result<Appointment, StoreError> {
        let mut inner = self.inner.lock().await;

        let patient_busy = inner.appointments.iter().any(|a| {
            a.patient_id == booking.patient_id && a.appointment_date == booking.appointment_date
        });
        if patient_busy {
            return Err(StoreError::DuplicateBooking(booking.appointment_date));
        }

        let doctor_count = inner
            .appointments
            .iter()
            .filter(|a| {
                a.doctor_id == booking.doctor_id && a.appointment_date == booking.appointment_date
            })
            .count() as i64;
        if doctor_count >= DOCTOR_DAILY_CAPACITY {
            return Err(StoreError::SlotsExhausted(booking.appointment_date));
        }

        let id = inner.next_id();
        let now = Utc::now();
        let appointment = Appointment {
            id,
            patient_id: booking.patient_id,
            doctor_id: booking.doctor_id,
            appointment_date: booking.appointment_date,
            status: STATUS_PENDING.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn appointment_counts(
        &self,
        doctor_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<NaiveDate, i64>, StoreError> {
        let inner = self.inner.lock().await;
        let mut counts = HashMap::new();
        for appointment in inner.appointments.iter().filter(|a| {
            a.doctor_id == doctor_id
                && a.appointment_date >= start
                && a.appointment_date <= end
        }) {
            *counts.entry(appointment.appointment_date).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.admins.iter().find(|a| a.username == username).cloned())
    }

    async fn upsert_admin(&self, username: &str, password_hash: &str) -> Result<i32, StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner.admins.iter_mut().find(|a| a.username == username) {
            existing.password = password_hash.to_string();
            return Ok(existing.id);
        }
        let id = inner.next_id();
        inner.admins.push(Admin {
            id,
            username: username.to_string(),
            password: password_hash.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }
}
