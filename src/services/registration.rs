use std::sync::Arc;

use crate::{
    api::AuthApi,
    error::{AppError, AppResult},
    models::{session::DEFAULT_ROLE, Genre, RegisterRequest},
};

/// Values entered on the register view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub favourite_genres: Vec<Genre>,
}

impl RegistrationForm {
    /// Client-side checks that must pass before anything is sent
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("First name", &self.first_name),
            ("Last name", &self.last_name),
            ("Email", &self.email),
            ("Password", &self.password),
        ];
        if let Some((label, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AppError::Validation(format!("{} is required.", label)));
        }

        if self.password != self.confirm_password {
            return Err(AppError::Validation("Passwords do not match.".to_string()));
        }

        Ok(())
    }

    /// True while the confirmation field holds text that differs from the password
    pub fn shows_mismatch_hint(&self) -> bool {
        !self.confirm_password.is_empty() && self.password != self.confirm_password
    }

    fn into_request(self) -> RegisterRequest {
        RegisterRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
            role: DEFAULT_ROLE.to_string(),
            favourite_genres: self.favourite_genres,
        }
    }
}

/// Creates accounts through the backend
pub struct Registrar {
    auth: Arc<dyn AuthApi>,
}

impl Registrar {
    pub fn new(auth: Arc<dyn AuthApi>) -> Self {
        Self { auth }
    }

    /// Validates and submits `form`
    ///
    /// Validation failures return `Validation` without a request. Any backend or
    /// transport failure is reported as `Registration`.
    pub async fn register(&self, form: RegistrationForm) -> AppResult<()> {
        form.validate()?;

        let request = form.into_request();
        match self.auth.register(&request).await {
            Ok(()) => {
                tracing::info!(email = %request.email, "Account registered");
                Ok(())
            }
            Err(AppError::Registration(message)) => {
                tracing::warn!(message = %message, "Registration rejected");
                Err(AppError::Registration(message))
            }
            Err(e) => {
                tracing::error!(error = %e, "Registration request failed");
                Err(AppError::Registration(String::new()))
            }
        }
    }
}
