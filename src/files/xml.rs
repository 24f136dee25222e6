//! XML record files.
//!
//! Documents look like:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <items>
//!   <item>
//!     <id>1</id>
//!     <name>a</name>
//!   </item>
//! </items>
//! ```

use super::{read_file, write_file};
use crate::error::{Result, ToolboxError};
use quick_xml::events::Event;
use quick_xml::se::Serializer;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the document root.
pub const ROOT_ELEMENT: &str = "items";

/// Name of each record element.
pub const ITEM_ELEMENT: &str = "item";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

#[derive(Serialize)]
#[serde(rename = "items")]
struct ItemsRef<'a, T> {
    item: &'a [T],
}

#[derive(Deserialize)]
struct Items<T> {
    #[serde(default = "Vec::new")]
    item: Vec<T>,
}

/// Reads every `<item>` under the `<items>` root.
pub fn read_xml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let items: Items<T> = quick_xml::de::from_str(&content).map_err(|e| {
        ToolboxError::serialization(format!("Failed to deserialize {}: {e}", path.display()))
    })?;
    Ok(items.item)
}

/// Writes `items` as an indented document, replacing the file.
pub fn write_xml<T: Serialize>(items: &[T], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut document = String::from(XML_DECLARATION);
    document.push('\n');

    let mut serializer = Serializer::new(&mut document);
    serializer.indent(' ', 2);
    ItemsRef { item: items }.serialize(serializer).map_err(|e| {
        ToolboxError::serialization(format!("Failed to serialize {}: {e}", path.display()))
    })?;
    document.push('\n');

    write_file(path, &document)
}

/// Appends one `<item>` to an existing document.
///
/// The document must be well-formed and rooted at `<items>`.
pub fn append_to_xml<T: Serialize>(item: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let content = read_file(path)?;

    let root = root_element(&content).map_err(|e| {
        ToolboxError::serialization(format!("Failed to load {}: {e}", path.display()))
    })?;
    if root.as_deref() != Some(ROOT_ELEMENT) {
        return Err(ToolboxError::serialization(format!(
            "{} has no <{ROOT_ELEMENT}> root element",
            path.display()
        )));
    }

    let element = quick_xml::se::to_string_with_root(ITEM_ELEMENT, item).map_err(|e| {
        ToolboxError::serialization(format!("Failed to serialize item: {e}"))
    })?;

    let updated = insert_before_root_end(&content, &element).ok_or_else(|| {
        ToolboxError::serialization(format!(
            "{} does not end with the <{ROOT_ELEMENT}> root",
            path.display()
        ))
    })?;

    write_file(path, &updated)
}

/// Parses the whole document and returns the root element's name.
fn root_element(content: &str) -> std::result::Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(content);
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) if root.is_none() => {
                root = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            _ => {}
        }
    }

    Ok(root)
}

fn insert_before_root_end(content: &str, element: &str) -> Option<String> {
    let trimmed = content.trim_end();
    let closing = format!("</{ROOT_ELEMENT}>");

    if let Some(head) = trimmed.strip_suffix(&closing) {
        let mut updated = head.to_string();
        if !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(&format!("  {element}\n{closing}\n"));
        return Some(updated);
    }

    // Self-closing root: `<items/>` or `<items />`.
    let opening = format!("<{ROOT_ELEMENT}");
    let start = trimmed.rfind(&opening)?;
    if trimmed[start + opening.len()..].trim_start() != "/>" {
        return None;
    }
    Some(format!(
        "{}<{ROOT_ELEMENT}>\n  {element}\n{closing}\n",
        &trimmed[..start]
    ))
}
