//! Integration tests for ToolBox.

pub mod files_test;
pub mod query_test;
