//! File-format helpers.
//!
//! Each helper opens its file, performs one read or write and closes it.
//! Records go through serde, so any `Serialize`/`Deserialize` type works.

mod json;
mod text;
mod xml;

pub use json::{read_json, write_json};
pub use text::{read_txt, FieldKind, TextField, TextSchema};
pub use xml::{append_to_xml, read_xml, write_xml, ITEM_ELEMENT, ROOT_ELEMENT};

use crate::error::{Result, ToolboxError};
use std::path::Path;

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ToolboxError::from_io(e, path))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| ToolboxError::from_io(e, path))
}
