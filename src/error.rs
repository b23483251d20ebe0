use reqwest::StatusCode;

use crate::models::Category;

/// Client-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {message}")]
    Backend { status: StatusCode, message: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Registration failed: {0}")]
    Registration(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub const LOGIN_FAILED_MESSAGE: &str = "Invalid email or password";
pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed. Please try again.";

impl AppError {
    /// True for failures that never reached a usable response
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::HttpClient(_))
    }

    /// Message shown inline by the view that issued the failing call
    ///
    /// Errors never escape a view; each boundary turns them into local text.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidCredentials(msg) if !msg.is_empty() => msg.clone(),
            AppError::InvalidCredentials(_) => LOGIN_FAILED_MESSAGE.to_string(),
            AppError::Registration(msg) if !msg.is_empty() => msg.clone(),
            AppError::Registration(_) => REGISTRATION_FAILED_MESSAGE.to_string(),
            AppError::Validation(msg) | AppError::InvalidInput(msg) => msg.clone(),
            AppError::Unauthenticated => "Please sign in to continue".to_string(),
            AppError::HttpClient(_)
            | AppError::Backend { .. }
            | AppError::MalformedPayload(_)
            | AppError::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Message shown in place of a category grid when its fetch fails
    pub fn fetch_failure_message(category: Category) -> String {
        format!("Error fetching {}", category)
    }
}

pub type AppResult<T> = Result<T, AppError>;
