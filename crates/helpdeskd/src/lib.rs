//! Helpdesk daemon library - exposes modules for testing.

pub mod routes;
pub mod server;
pub mod sessions;
