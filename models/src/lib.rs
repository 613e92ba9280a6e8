pub mod admin;
pub mod appointment;
pub mod assistant;
pub mod credentials;
pub mod disease;
pub mod doctor;
pub mod errors;
pub mod patient;

pub use admin::Admin;
pub use appointment::{
    Appointment, BookAppointmentRequest, NewAppointment, DOCTOR_DAILY_CAPACITY, STATUS_PENDING,
};
pub use assistant::{Assistant, CreateAssistantRequest, NewAssistant};
pub use disease::{CreateDiseaseRequest, Disease, DiseaseWithDoctor, NewDisease};
pub use doctor::{CreateDoctorRequest, Doctor, NewDoctor};
pub use errors::ValidationError;
pub use patient::{CreatePatientRequest, NewPatient, Patient, PatientSummary};
