//! Datafos - custom-structured record databases
//!
//! Forms with typed fields, entries with one content row per field,
//! template rendering and an advanced search that narrows candidates one
//! criterion at a time. Field behaviour lives in `datafos-fields`, template
//! rendering in `datafos-template`; this crate adds storage, search
//! execution, services, configuration and logging.

#![allow(
    clippy::too_many_arguments, // Search entry points take the full request shape
    clippy::type_complexity,
)]

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{Form, RecordFilter, RecordRow, Visibility};
pub use services::{FormManager, SearchRequest, SubmissionResult};
