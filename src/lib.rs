//! Snapgram client.
//!
//! A social-media client for a hosted backend-as-a-service: sign-up and
//! sign-in with schema-validated forms, a session context tracking who is
//! signed in, and thin wrappers over the remote account and document APIs
//! for posts, likes, saves and users. The screens are served as JSON view
//! models from a local HTTP surface.

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod dto;
pub mod errors;
pub mod forms;
pub mod models;
pub mod pages;
pub mod routes;
pub mod session;
pub mod states;

#[cfg(test)]
mod testing;

pub use states::AppState;
