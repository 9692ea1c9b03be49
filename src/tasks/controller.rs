//! The task list page: fetch, render, mutate, re-fetch.
//!
//! The controller never patches its snapshot after a mutation. Every
//! successful create/update/delete is followed by exactly one fresh fetch,
//! issued only after the mutation's success response arrived.
//!
//! Each request runs under a child of the controller's teardown token, so
//! `teardown()` (or dropping the controller) aborts whatever is in flight.
//! A cancelled request leaves the state exactly as it was.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::create_form::CreateTaskForm;
use super::view::TaskView;
use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::{MutationResponse, Session, Task, TaskId};
use crate::notify::{Notification, Notifier};

#[derive(Debug, Clone, PartialEq)]
pub enum TaskListState {
    Idle,
    Loading,
    Empty,
    Populated(Vec<Task>),
    Failed(ClientError),
}

/// The question put to the user before a delete goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    pub title: String,
    pub text: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl Default for ConfirmationPrompt {
    fn default() -> Self {
        ConfirmationPrompt {
            title: "Are you sure?".to_string(),
            text: "You won't be able to revert this!".to_string(),
            confirm_label: "Yes, delete it!".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

/// A delete waiting for the user's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    pub id: TaskId,
    pub prompt: ConfirmationPrompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(MutationResponse),
    Cancelled,
}

/// Answers a confirmation prompt.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool;
}

/// Says yes to everything (`--yes`).
pub struct AlwaysConfirm;

#[async_trait]
impl Confirmer for AlwaysConfirm {
    async fn confirm(&self, _prompt: &ConfirmationPrompt) -> bool {
        true
    }
}

pub struct TaskListController {
    api: Arc<ApiClient>,
    session: Session,
    notifier: Arc<dyn Notifier>,
    state: TaskListState,
    pending_delete: Option<PendingDeletion>,
    last_error: Option<ClientError>,
    reported: Option<ClientError>,
    teardown: CancellationToken,
}

impl TaskListController {
    pub fn new(api: Arc<ApiClient>, session: Session, notifier: Arc<dyn Notifier>) -> Self {
        TaskListController {
            api,
            session,
            notifier,
            state: TaskListState::Idle,
            pending_delete: None,
            last_error: None,
            reported: None,
            teardown: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> &TaskListState {
        &self.state
    }

    pub fn view(&self) -> TaskView {
        TaskView::from_state(&self.state)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The most recent failure, cleared by the next successful mutation.
    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Whether `error` is the failed mutation the notifier was last told about.
    pub fn was_reported(&self, error: &ClientError) -> bool {
        self.reported.as_ref() == Some(error)
    }

    pub fn pending_delete(&self) -> Option<&PendingDeletion> {
        self.pending_delete.as_ref()
    }

    /// A handle that aborts every in-flight request of this controller when cancelled.
    pub fn teardown_handle(&self) -> CancellationToken {
        self.teardown.clone()
    }

    pub fn teardown(&self) {
        self.teardown.cancel();
    }

    /// First load of the page.
    pub async fn activate(&mut self) -> Result<(), ClientError> {
        self.refresh().await
    }

    /// Fetches the owner's tasks once. Never schedules another fetch.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let cancel = self.teardown.child_token();
        let previous = std::mem::replace(&mut self.state, TaskListState::Loading);

        match self.api.list_tasks(&self.session, &cancel).await {
            Ok(tasks) if tasks.is_empty() => {
                self.state = TaskListState::Empty;
                Ok(())
            }
            Ok(tasks) => {
                debug!("Loaded {} tasks", tasks.len());
                self.state = TaskListState::Populated(tasks);
                Ok(())
            }
            Err(ClientError::Cancelled) => {
                self.state = previous;
                Err(ClientError::Cancelled)
            }
            Err(e) => {
                warn!("Loading tasks failed: {}", e);
                self.state = TaskListState::Failed(e.clone());
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Marks `task` done: sends the whole task with `status: true`, then re-fetches.
    pub async fn update_task(&mut self, task: &Task) -> Result<MutationResponse, ClientError> {
        let payload = task.as_completed();
        let cancel = self.teardown.child_token();

        match self.api.update_task(&self.session, &payload, &cancel).await {
            Ok(res) if res.success => {
                info!("Task {} updated", task.id);
                self.after_mutation(Notification::success(res.message_or("Task updated")))
                    .await;
                Ok(res)
            }
            Ok(res) => Err(self.report(
                "Update failed",
                ClientError::Server(res.message_or("The server did not apply the update")),
            )),
            Err(e) => Err(self.report("Update failed", e)),
        }
    }

    /// Step one of a delete: remember the target and return the prompt to show.
    /// Nothing is sent.
    pub fn request_delete(&mut self, id: TaskId) -> &PendingDeletion {
        self.pending_delete.insert(PendingDeletion {
            id,
            prompt: ConfirmationPrompt::default(),
        })
    }

    /// The user declined. Nothing is sent and the list is untouched.
    pub fn cancel_delete(&mut self) -> Option<PendingDeletion> {
        self.pending_delete.take()
    }

    /// The user confirmed: issue the DELETE, then re-fetch on success.
    pub async fn confirm_delete(&mut self) -> Result<MutationResponse, ClientError> {
        let pending = self.pending_delete.take().ok_or_else(|| {
            ClientError::Validation("No deletion is awaiting confirmation".to_string())
        })?;
        let cancel = self.teardown.child_token();

        match self.api.delete_task(&self.session, &pending.id, &cancel).await {
            Ok(res) if res.success => {
                info!("Task {} deleted", pending.id);
                let notification = Notification::success(res.message_or("Task deleted"))
                    .with_text("Your file has been deleted.")
                    .sticky();
                self.after_mutation(notification).await;
                Ok(res)
            }
            Ok(res) => Err(self.report(
                "Delete failed",
                ClientError::Server(res.message_or("The server did not delete the task")),
            )),
            Err(e) => Err(self.report("Delete failed", e)),
        }
    }

    /// Both steps of a delete, with `confirmer` answering the prompt.
    pub async fn delete_task(
        &mut self,
        id: TaskId,
        confirmer: &dyn Confirmer,
    ) -> Result<DeleteOutcome, ClientError> {
        let prompt = self.request_delete(id).prompt.clone();
        if confirmer.confirm(&prompt).await {
            self.confirm_delete().await.map(DeleteOutcome::Deleted)
        } else {
            self.cancel_delete();
            Ok(DeleteOutcome::Cancelled)
        }
    }

    /// Submits the create form for the session owner, then re-fetches.
    /// On failure the form keeps its values and carries the error.
    pub async fn create_task(
        &mut self,
        form: &mut CreateTaskForm,
    ) -> Result<MutationResponse, ClientError> {
        form.begin_attempt();
        form.validate()?;

        let new_task = form.to_new_task(&self.session.email);
        let cancel = self.teardown.child_token();

        let result = match self.api.create_task(&self.session, &new_task, &cancel).await {
            Ok(res) if res.success => Ok(res),
            Ok(res) => Err(ClientError::Server(
                res.message_or("The server did not create the task"),
            )),
            Err(e) => Err(e),
        };

        match result {
            Ok(res) => {
                form.reset();
                info!("Task '{}' created", new_task.title);
                self.after_mutation(Notification::success(res.message_or("Task created")))
                    .await;
                Ok(res)
            }
            Err(e) => {
                form.fail(e.clone());
                Err(self.report("Create failed", e))
            }
        }
    }

    /// A mutation took effect: reload once, then tell the user. A failing
    /// reload is recorded in the state; the mutation itself still stands.
    async fn after_mutation(&mut self, notification: Notification) {
        self.last_error = None;
        self.reported = None;
        if let Err(e) = self.refresh().await {
            debug!("Re-fetch after mutation did not complete: {}", e);
        }
        self.notifier.notify(notification);
    }

    /// Records a failed mutation and makes sure the user sees it.
    /// Cancellations are not failures and are passed through silently.
    fn report(&mut self, action: &str, error: ClientError) -> ClientError {
        if error.is_cancelled() {
            return error;
        }
        warn!("{}: {}", action, error);
        self.last_error = Some(error.clone());
        self.reported = Some(error.clone());
        self.notifier
            .notify(Notification::error(format!("{}: {}", action, error)));
        error
    }
}

impl Drop for TaskListController {
    fn drop(&mut self) {
        self.teardown.cancel();
    }
}
