//! Screening — the result-reconciler core behind the resume analysis view.
//!
//! Loads per-folder file records and their analysis results from the hosted
//! backend, normalizes the historically inconsistent keyword fields, and
//! serves the listing view a sortable, searchable result set with a
//! two-key delete flow. Rendering, routing, and session management live in
//! the embedding shell and are reached through the collaborator traits in
//! [`store`], [`auth`], [`cache`], and [`ui`].

pub mod auth;
pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod reconciler;
pub mod store;
pub mod telemetry;
pub mod ui;

pub use config::Config;
pub use errors::AppError;
pub use reconciler::{Collaborators, LoadOutcome, Reconciler};
