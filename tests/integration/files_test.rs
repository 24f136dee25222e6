//! File helper integration tests.
//!
//! Exercises the XML, JSON and text helpers together on scratch files.

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use tempfile::tempdir;
use toolbox::error::ToolboxError;
use toolbox::files::{
    append_to_xml, read_json, read_txt, read_xml, write_json, write_xml, FieldKind, TextSchema,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Book {
    isbn: String,
    title: String,
    pages: u32,
    available: bool,
}

fn library() -> Vec<Book> {
    vec![
        Book {
            isbn: "978-0".to_string(),
            title: "The Rust Programming Language".to_string(),
            pages: 560,
            available: true,
        },
        Book {
            isbn: "978-1".to_string(),
            title: "Programming Rust".to_string(),
            pages: 738,
            available: false,
        },
    ]
}

#[test]
fn test_text_to_xml_to_json() {
    let dir = tempdir().unwrap();
    let txt = dir.path().join("books.txt");
    let xml = dir.path().join("books.xml");
    let json = dir.path().join("books.json");

    std::fs::write(
        &txt,
        "978-0|The Rust Programming Language|560|true\n\
         978-1|Programming Rust|738|false\n\
         malformed line\n",
    )
    .unwrap();

    let schema: TextSchema = "isbn,title,pages:integer,available:boolean".parse().unwrap();
    let books: Vec<Book> = read_txt(&txt, "|", &schema).unwrap();
    assert_eq!(books, library());

    write_xml(&books, &xml).unwrap();
    let from_xml: Vec<Book> = read_xml(&xml).unwrap();

    write_json(&from_xml, &json).unwrap();
    let from_json: Vec<Book> = read_json(&json).unwrap();

    assert_eq!(from_json, library());
}

#[test]
fn test_append_to_xml_grows_by_one() {
    let dir = tempdir().unwrap();
    let xml = dir.path().join("books.xml");
    write_xml(&library(), &xml).unwrap();

    let extra = Book {
        isbn: "978-2".to_string(),
        title: "Rust in Action".to_string(),
        pages: 456,
        available: true,
    };
    append_to_xml(&extra, &xml).unwrap();
    append_to_xml(&extra, &xml).unwrap();

    let books: Vec<Book> = read_xml(&xml).unwrap();
    assert_eq!(books.len(), 4);
    assert_eq!(books[3], extra);
}

#[test]
fn test_xml_with_wrong_field_type_is_serialization_error() {
    let dir = tempdir().unwrap();
    let xml = dir.path().join("books.xml");
    std::fs::write(
        &xml,
        "<items><item><isbn>1</isbn><title>t</title><pages>many</pages>\
         <available>true</available></item></items>",
    )
    .unwrap();

    let err = read_xml::<Book>(&xml).unwrap_err();
    assert!(matches!(err, ToolboxError::Serialization(_)));
}

#[test]
fn test_append_to_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = append_to_xml(&library()[0], dir.path().join("absent.xml")).unwrap_err();
    assert!(matches!(err, ToolboxError::Io(_)));
}

#[test]
fn test_text_schema_builder_matches_parsed() {
    let built = TextSchema::new()
        .field("isbn", FieldKind::Text)
        .field("title", FieldKind::Text)
        .field("pages", FieldKind::Integer)
        .field("available", FieldKind::Boolean);
    let parsed: TextSchema = "isbn:text,title:string,pages:int,available:bool"
        .parse()
        .unwrap();

    assert_eq!(built, parsed);
    assert_eq!(built.len(), 4);
}
