use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Task identifiers arrive either as numbers or as strings (e.g. object ids).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for TaskId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Task id must not be empty".to_string());
        }
        Ok(match s.parse::<i64>() {
            Ok(n) => TaskId::Number(n),
            Err(_) => TaskId::Text(s.to_string()),
        })
    }
}

impl From<i64> for TaskId {
    fn from(n: i64) -> Self {
        TaskId::Number(n)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::Text(s.to_string())
    }
}

impl From<TaskId> for Value {
    fn from(id: TaskId) -> Self {
        match id {
            TaskId::Number(n) => Value::from(n),
            TaskId::Text(s) => Value::from(s),
        }
    }
}

/// A task as the API returns it. The API owns it; the client only ever
/// holds the snapshot of the last fetch.
///
/// Fields the client does not know about are kept in `extra` so that an
/// update sends the whole record back unchanged apart from `status`. The id
/// may arrive as `id` or `_id` and the owner as `email` or `ownerEmail`;
/// whichever keys came in are the ones that go back out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: bool,
    pub owner_email: String,
    pub extra: Map<String, Value>,
    keys: WireKeys,
}

/// Which of the canonical keys the record carried.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct WireKeys {
    id: bool,
    email: bool,
}

impl Task {
    /// The payload sent to the update endpoint: this task, marked done.
    pub fn as_completed(&self) -> Task {
        Task {
            status: true,
            ..self.clone()
        }
    }
}

impl TryFrom<Map<String, Value>> for Task {
    type Error = String;

    fn try_from(mut record: Map<String, Value>) -> Result<Self, Self::Error> {
        let keys = WireKeys {
            id: record.contains_key("id"),
            email: record.contains_key("email"),
        };

        // `_id` stays in `extra` so it is sent back as received
        let id = match record.remove("id") {
            Some(id) => id,
            None => record
                .get("_id")
                .cloned()
                .ok_or("missing field `id`")?,
        };
        let id = serde_json::from_value(id).map_err(|e| format!("invalid task id: {}", e))?;

        let title = match record.remove("title") {
            Some(Value::String(title)) => title,
            Some(other) => return Err(format!("invalid task title: {}", other)),
            None => return Err("missing field `title`".to_string()),
        };
        let description = optional_string(record.remove("description"), "description")?;
        let status = match record.remove("status") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(status)) => status,
            Some(other) => return Err(format!("invalid task status: {}", other)),
        };
        let owner_email = match record.remove("email") {
            Some(email) => optional_string(Some(email), "email")?,
            None => optional_string(record.get("ownerEmail").cloned(), "ownerEmail")?,
        };

        Ok(Task {
            id,
            title,
            description,
            status,
            owner_email,
            extra: record,
            keys,
        })
    }
}

impl From<Task> for Map<String, Value> {
    fn from(task: Task) -> Self {
        let mut record = task.extra;
        if task.keys.id || !record.contains_key("_id") {
            record.insert("id".to_string(), task.id.into());
        }
        record.insert("title".to_string(), task.title.into());
        record.insert("description".to_string(), task.description.into());
        record.insert("status".to_string(), task.status.into());
        let send_email =
            task.keys.email || (!record.contains_key("ownerEmail") && !task.owner_email.is_empty());
        if send_email {
            record.insert("email".to_string(), task.owner_email.into());
        }
        record
    }
}

fn optional_string(value: Option<Value>, field: &str) -> Result<String, String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(format!("invalid task {}: {}", field, other)),
    }
}
