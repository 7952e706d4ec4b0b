//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with the codec routes and shared middleware.
//! - Inject shared application state (`AppState`) into handlers.
//! - Map codec failures onto the opaque error bodies the save editor expects.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
