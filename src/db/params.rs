//! Named parameter binding.
//!
//! sqlx only binds positionally, so `@name` and `:name` placeholders are
//! rewritten to the backend's positional form and their values collected in
//! occurrence order. Placeholders inside string literals, quoted identifiers
//! and comments are left alone, as are PostgreSQL `::` casts and `$$` bodies
//! and MySQL `@@` system variables.

use super::types::Params;
use super::DatabaseBackend;
use crate::error::{Result, ToolboxError};
use std::iter::Peekable;
use std::str::Chars;

/// How the backend spells positional placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` (MySQL, SQLite).
    Question,
    /// `$1`, `$2`, ... (PostgreSQL).
    Dollar,
}

/// A statement ready for execution: SQL text plus positional values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundStatement {
    pub sql: String,
    pub values: Vec<String>,
}

impl BoundStatement {
    /// Wraps a statement that is executed unmodified.
    pub fn verbatim(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            values: Vec::new(),
        }
    }
}

/// Rewrites named placeholders in `sql` and binds their values from `params`.
///
/// A placeholder with no entry in `params` is an execution error. Entries that
/// no placeholder refers to are ignored.
pub fn bind_named(sql: &str, params: &Params, backend: DatabaseBackend) -> Result<BoundStatement> {
    let style = backend.placeholder_style();
    let backslash_escapes = backend == DatabaseBackend::MySql;
    let mut out = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push(c);
                copy_quoted(&mut chars, &mut out, c, backslash_escapes);
            }
            '`' => {
                out.push(c);
                copy_quoted(&mut chars, &mut out, c, false);
            }
            '-' if chars.peek() == Some(&'-') => {
                out.push(c);
                out.extend(chars.next());
                copy_until(&mut chars, &mut out, "\n");
            }
            '/' if chars.peek() == Some(&'*') => {
                out.push(c);
                out.extend(chars.next());
                copy_until(&mut chars, &mut out, "*/");
            }
            '$' if backend == DatabaseBackend::Postgres => {
                out.push(c);
                if let Some(delimiter) = dollar_quote_opener(&mut chars, &mut out) {
                    copy_until(&mut chars, &mut out, &delimiter);
                }
            }
            ':' | '@' if chars.peek() == Some(&c) => {
                // `::type` cast or `@@variable`
                out.push(c);
                out.push(c);
                chars.next();
            }
            ':' | '@' if chars.peek().is_some_and(|n| is_name_start(*n)) => {
                let name = collect_name(&mut chars);
                let value = lookup(params, &name).ok_or_else(|| {
                    ToolboxError::execution(format!("No value supplied for parameter '{c}{name}'"))
                })?;
                values.push(value.to_string());
                match style {
                    PlaceholderStyle::Question => out.push('?'),
                    PlaceholderStyle::Dollar => {
                        out.push('$');
                        out.push_str(&values.len().to_string());
                    }
                }
            }
            _ => out.push(c),
        }
    }

    Ok(BoundStatement { sql: out, values })
}

/// Finds a parameter by bare name, then as `@name`, then as `:name`.
fn lookup<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    [name.to_string(), format!("@{name}"), format!(":{name}")]
        .iter()
        .find_map(|key| params.get(key))
        .map(String::as_str)
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn collect_name(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

/// Copies a quoted run up to and including the closing quote.
///
/// A doubled quote is an escaped quote and does not end the run, nor does a
/// backslash-escaped one when `backslash_escapes` is set.
fn copy_quoted(
    chars: &mut Peekable<Chars>,
    out: &mut String,
    quote: char,
    backslash_escapes: bool,
) {
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '\\' && backslash_escapes {
            out.extend(chars.next());
        } else if c == quote {
            if chars.peek() == Some(&quote) {
                out.push(quote);
                chars.next();
            } else {
                return;
            }
        }
    }
}

/// Copies characters up to and including `terminator` (or to the end).
fn copy_until(chars: &mut Peekable<Chars>, out: &mut String, terminator: &str) {
    let start = out.len();
    for c in chars.by_ref() {
        out.push(c);
        if out[start..].ends_with(terminator) {
            return;
        }
    }
}

/// Finishes copying a `$tag$` opener whose leading `$` is already in `out`.
///
/// Returns the full delimiter, or `None` if the `$` does not open a
/// dollar-quoted string (e.g. `$1`).
fn dollar_quote_opener(chars: &mut Peekable<Chars>, out: &mut String) -> Option<String> {
    let tag = if chars.peek().is_some_and(|c| is_name_start(*c)) {
        let tag = collect_name(chars);
        out.push_str(&tag);
        tag
    } else {
        String::new()
    };

    if chars.peek() == Some(&'$') {
        chars.next();
        out.push('$');
        Some(format!("${tag}$"))
    } else {
        None
    }
}
