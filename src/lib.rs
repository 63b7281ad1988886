//! Library crate for the scoreboard backend, shared by the control server, the screen renderer and
//! the OpenAPI generator.

/// Runtime configuration loaded from JSON and the environment.
pub mod config;
/// Persistence of the display state.
pub mod dao;
mod dto;
mod error;
/// Fixed-rate screen renderer.
pub mod render;
/// HTTP routes.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared application state and the display domain model.
pub mod state;
