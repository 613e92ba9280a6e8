// models/src/errors.rs

pub use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("cni must start with two letters followed by alphanumerics")]
    InvalidCni,
    #[error("phoneNumber must be 8 to 10 digits")]
    InvalidPhone,
    #[error("age must be between 1 and 130")]
    InvalidAge,
    #[error("password must be at least 8 characters with upper, lower, digit and special characters")]
    WeakPassword,
    #[error("invalid appointment date format: {0}")]
    InvalidDate(String),
    #[error("{field} must be a positive id")]
    InvalidId { field: &'static str },
}
