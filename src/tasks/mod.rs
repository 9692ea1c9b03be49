pub mod controller;
pub mod create_form;
pub mod poller;
pub mod view;

pub use controller::{
    AlwaysConfirm, ConfirmationPrompt, Confirmer, DeleteOutcome, PendingDeletion,
    TaskListController, TaskListState,
};
pub use create_form::CreateTaskForm;
pub use poller::spawn_poller;
pub use view::{TaskCard, TaskView};
