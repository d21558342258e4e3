//! # FormCheck-API
//!
//! Boundary layer for exercise form analysis: configuration loading, the
//! request/response service and the `formcheck` command-line tool.
//!
//! ## Operations
//!
//! - `analyze` - validate landmarks and echo them with flagged points
//! - `feedback` - validate landmarks supplied by the client
//! - `calibrate` - store a baseline snapshot for an exercise
//! - `classify` - infer squat or plank from a snapshot
//! - `instructions` - steps, tips and common mistakes per exercise

pub mod cli;
pub mod config;
pub mod error;
pub mod service;

pub use cli::{Cli, Commands};
pub use crate::config::*;
pub use error::*;
pub use service::*;
