//! Client core for the User Feedback Wall.
//!
//! The wall is a single list of feedback entries served by a remote backend
//! (`GET/POST /api/feedback`). This crate owns the client side of it:
//!
//! - [`client`]: typed HTTP access to the backend with error classification.
//! - [`validation`]: form checks that run before anything touches the network.
//! - [`state`]: the explicit state container and the presentation state machine.
//! - [`wall`]: the fetch and submission cycles that drive the state.
//! - [`render`]: text rendering of the wall for the terminal front end.
//! - [`config`]: resolution of the backend base URL.

pub mod client;
pub mod config;
pub mod models;
pub mod render;
pub mod state;
pub mod validation;
pub mod wall;

pub const APP_NAME: &str = "User Feedback Wall";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
