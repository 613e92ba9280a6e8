pub mod admin;
pub mod appointments;
pub mod assistants;
pub mod diseases;
pub mod doctors;
pub mod patients;
