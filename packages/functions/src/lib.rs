//! # Standalone task endpoint
//!
//! A single JSON endpoint, deployed apart from the web app, that returns the
//! caller's task list given their bearer token. It goes through the same
//! [`api::Backend`] seam as the app, so row scoping and ordering (newest
//! first) match the dashboard exactly.
//!
//! | Condition | Status | Body |
//! |-----------|--------|------|
//! | backend not configured | 500 | `{"error":"Missing Supabase configuration"}` |
//! | no `Authorization` header | 401 | `{"error":"Missing authorization header"}` |
//! | token rejected | 401 | `{"error":"Unauthorized","details":...}` |
//! | task query failed | 500 | `{"error":"Failed to query database","details":...}` |
//! | ok | 200 | `{"user":{"id","email"},"tasks":[...],"count":n}` |

pub mod config;
pub mod handler;

pub use config::ServerConfig;
pub use handler::{router, AppState, FunctionError, TasksResponse};
