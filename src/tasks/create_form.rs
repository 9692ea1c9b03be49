use crate::error::ClientError;
use crate::models::NewTask;

/// The "create task" form shown when the user has no tasks yet.
#[derive(Debug, Clone, Default)]
pub struct CreateTaskForm {
    pub title: String,
    pub description: String,
    title_error: Option<String>,
    description_error: Option<String>,
    submit_error: Option<ClientError>,
}

impl CreateTaskForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        CreateTaskForm {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Both fields are required. Messages stay on the form until the next validation.
    pub fn validate(&mut self) -> Result<(), ClientError> {
        self.title_error = self
            .title
            .trim()
            .is_empty()
            .then(|| "Title is required".to_string());
        self.description_error = self
            .description
            .trim()
            .is_empty()
            .then(|| "Description is required".to_string());

        let messages: Vec<&str> = [self.title_error.as_deref(), self.description_error.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Validation(messages.join("; ")))
        }
    }

    /// The request body for `owner`. New tasks start open.
    pub fn to_new_task(&self, owner: &str) -> NewTask {
        NewTask {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            status: false,
            email: owner.to_string(),
        }
    }

    pub fn title_error(&self) -> Option<&str> {
        self.title_error.as_deref()
    }

    pub fn description_error(&self) -> Option<&str> {
        self.description_error.as_deref()
    }

    pub fn submit_error(&self) -> Option<&ClientError> {
        self.submit_error.as_ref()
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.submit_error = None;
    }

    pub(crate) fn fail(&mut self, error: ClientError) {
        self.submit_error = Some(error);
    }

    pub fn reset(&mut self) {
        *self = CreateTaskForm::default();
    }
}
