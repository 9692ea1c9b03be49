use std::fmt;

use super::controller::TaskListState;
use crate::models::{Task, TaskId};

/// One task as displayed in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCard {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub done: bool,
    /// Route of the full edit page for this task.
    pub edit_link: String,
}

impl From<&Task> for TaskCard {
    fn from(task: &Task) -> Self {
        TaskCard {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            done: task.status,
            edit_link: format!("/task/update/{}", task.id),
        }
    }
}

/// What the task page shows for a given controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskView {
    Loading,
    /// No tasks yet: offer the create form.
    CreateTask,
    Grid(Vec<TaskCard>),
    Error(String),
}

impl TaskView {
    pub fn from_state(state: &TaskListState) -> Self {
        match state {
            TaskListState::Idle | TaskListState::Loading => TaskView::Loading,
            TaskListState::Empty => TaskView::CreateTask,
            TaskListState::Populated(tasks) => TaskView::Grid(tasks.iter().map(TaskCard::from).collect()),
            TaskListState::Failed(e) => TaskView::Error(e.to_string()),
        }
    }
}

impl fmt::Display for TaskView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskView::Loading => writeln!(f, "Loading....."),
            TaskView::CreateTask => {
                writeln!(f, "You have no tasks yet.")?;
                writeln!(
                    f,
                    "Create one with: taskdeck tasks create --title <TITLE> --description <TEXT>"
                )
            }
            TaskView::Grid(cards) => {
                for card in cards {
                    let mark = if card.done { "x" } else { " " };
                    writeln!(f, "[{}] #{} {}", mark, card.id, card.title)?;
                    if !card.description.is_empty() {
                        writeln!(f, "    {}", card.description)?;
                    }
                    writeln!(f, "    edit: {}", card.edit_link)?;
                }
                Ok(())
            }
            TaskView::Error(message) => writeln!(f, "Could not load tasks: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use serde_json::json;

    fn task(id: i64, title: &str, status: bool) -> Task {
        serde_json::from_value(json!({
            "id": id, "title": title, "description": "desc", "status": status
        }))
        .unwrap()
    }

    #[test]
    fn empty_list_offers_creation() {
        assert_eq!(TaskView::from_state(&TaskListState::Empty), TaskView::CreateTask);
    }

    #[test]
    fn loading_before_first_result() {
        assert_eq!(TaskView::from_state(&TaskListState::Idle), TaskView::Loading);
        assert_eq!(TaskView::from_state(&TaskListState::Loading), TaskView::Loading);
        assert_eq!(TaskView::Loading.to_string(), "Loading.....\n");
    }

    #[test]
    fn one_card_per_task() {
        let view = TaskView::from_state(&TaskListState::Populated(vec![
            task(1, "first", false),
            task(2, "second", true),
        ]));
        match &view {
            TaskView::Grid(cards) => {
                assert_eq!(cards.len(), 2);
                assert_eq!(cards[1].edit_link, "/task/update/2");
                assert!(cards[1].done);
            }
            other => panic!("expected grid, got {:?}", other),
        }
        let text = view.to_string();
        assert!(text.contains("[ ] #1 first"));
        assert!(text.contains("[x] #2 second"));
    }

    #[test]
    fn failure_is_shown() {
        let view = TaskView::from_state(&TaskListState::Failed(ClientError::Network(
            "timed out".into(),
        )));
        assert_eq!(
            view.to_string(),
            "Could not load tasks: network error: timed out\n"
        );
    }
}
