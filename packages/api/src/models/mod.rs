//! Data models for the application.

mod session;
mod task;
mod user;

pub use session::{
    OAuthProvider, Session, SignUpOutcome, SignUpRequest, UserAttributes, EXPIRY_MARGIN_SECS,
};
pub use task::{NewTaskRow, Task, TaskInsert, TaskStats, TaskUpdate, TASKS_TABLE};
pub use user::UserInfo;
