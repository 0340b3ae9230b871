//! Oblique Strategies service - generates Brian Eno style creative prompts
//!
//! An HTTP endpoint builds prompts from the caller's options, asks a Gemini
//! model for one strategy per requested item, cleans and validates each
//! answer, and falls back to a curated list of authentic strategies according
//! to the configured policy. A small client for the endpoint is included.

pub mod ai;
pub mod app;
pub mod client;
pub mod error;
pub mod generator;
pub mod models;
pub mod prompts;
pub mod routes;
pub mod state;
pub mod strategies;

pub use error::{Error, Result};
