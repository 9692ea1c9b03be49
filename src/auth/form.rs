use crate::error::ClientError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Per-field validation messages of the login form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }

    fn summary(&self) -> String {
        [self.email.as_deref(), self.password.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// State of the login form for one submission. Field messages come from the
/// last validation; `login_error` from the last attempt.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    errors: FieldErrors,
    login_error: Option<ClientError>,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        LoginForm {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Checks required fields. On failure the field messages are kept on the
    /// form and a `Validation` error is returned; nothing may be sent.
    pub fn validate(&mut self) -> Result<(), ClientError> {
        let mut errors = FieldErrors::default();

        if self.email.trim().is_empty() {
            errors.email = Some("Email Address is required".to_string());
        }

        if self.password.is_empty() {
            errors.password = Some("Password is required".to_string());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.password = Some(format!(
                "Password must be {} characters or longer",
                MIN_PASSWORD_LEN
            ));
        }

        let result = if errors.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Validation(errors.summary()))
        };
        self.errors = errors;
        result
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The single message shown above the form after a failed attempt.
    pub fn login_error(&self) -> Option<&ClientError> {
        self.login_error.as_ref()
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.login_error = None;
    }

    pub(crate) fn fail(&mut self, error: ClientError) {
        self.login_error = Some(error);
    }

    /// Clears values and messages after a successful login.
    pub fn reset(&mut self) {
        *self = LoginForm::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_form_passes() {
        let mut form = LoginForm::new("user@example.com", "secret1");
        assert!(form.validate().is_ok());
        assert!(form.field_errors().is_empty());
    }

    #[test]
    fn missing_email_is_reported_on_the_field() {
        let mut form = LoginForm::new("   ", "secret1");
        let err = form.validate().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
        assert_eq!(
            form.field_errors().email.as_deref(),
            Some("Email Address is required")
        );
        assert!(form.field_errors().password.is_none());
    }

    #[test]
    fn short_password_is_reported_on_the_field() {
        let mut form = LoginForm::new("user@example.com", "12345");
        assert!(form.validate().is_err());
        assert_eq!(
            form.field_errors().password.as_deref(),
            Some("Password must be 6 characters or longer")
        );
    }

    #[test]
    fn empty_password_is_required_not_short() {
        let mut form = LoginForm::new("", "");
        let err = form.validate().unwrap_err();
        assert_eq!(
            form.field_errors().password.as_deref(),
            Some("Password is required")
        );
        assert_eq!(
            err.to_string(),
            "Email Address is required; Password is required"
        );
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        let mut form = LoginForm::new("user@example.com", "ééééé");
        assert!(form.validate().is_err());
        let mut form = LoginForm::new("user@example.com", "éééééé");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn revalidation_clears_fixed_fields() {
        let mut form = LoginForm::new("", "123");
        assert!(form.validate().is_err());
        form.email = "user@example.com".to_string();
        form.password = "123456".to_string();
        assert!(form.validate().is_ok());
        assert!(form.field_errors().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut form = LoginForm::new("user@example.com", "secret1");
        form.fail(ClientError::Auth("nope".into()));
        form.reset();
        assert!(form.email.is_empty());
        assert!(form.password.is_empty());
        assert!(form.login_error().is_none());
    }
}
