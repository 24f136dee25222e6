//! ToolBox - raw SQL queries as string rows, plus file and string helpers.
//!
//! This library exposes the core modules for the `toolbox` binary and for
//! integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod files;
pub mod logging;
pub mod strings;
