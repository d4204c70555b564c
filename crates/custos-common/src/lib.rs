//! Custos Common Library
//!
//! Shared error handling and logging bootstrap for the Custos workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the [`CommonError`] type and [`Result`] alias used
//!   across workspace members.
//! - **Logging**: env-driven tracing initialization with console/file
//!   targets and text/JSON formats.

pub mod error;
pub mod logging;

pub use error::{CommonError, Result};
