//! String helpers.

/// Upper-cases the first character and leaves the rest untouched.
///
/// Empty input yields an empty string. A first character with a multi-char
/// upper-case form (`ß` -> `SS`) expands.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Compares two strings ignoring case (Unicode lower-case folding).
pub fn equals_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Method-call form of the helpers in this module.
pub trait StringExt {
    fn capitalize(&self) -> String;
    fn equals_ignore_case(&self, other: &str) -> bool;
}

impl StringExt for str {
    fn capitalize(&self) -> String {
        capitalize(self)
    }

    fn equals_ignore_case(&self, other: &str) -> bool {
        equals_ignore_case(self, other)
    }
}
