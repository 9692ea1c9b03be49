pub mod api;
pub mod session;
pub mod task;

pub use api::*;
pub use session::Session;
pub use task::{Task, TaskId};
