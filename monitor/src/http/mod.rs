//! HTTP presenter: serves the dashboard page and the status API.

pub mod api;
pub mod assets;
pub mod server;

pub use server::{AppState, create_app, serve};
