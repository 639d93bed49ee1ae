//! Shared validation rules and the flattened error map the forms and the API report.

use std::{borrow::Cow, collections::BTreeMap, fmt};

use serde::Serialize;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Lesson content bounds, counted on the text left after stripping markup.
pub const LESSON_CONTENT_MIN: usize = 20;
pub const LESSON_CONTENT_MAX: usize = 10_000;

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

pub fn lesson_content(value: &str) -> Result<(), ValidationError> {
    let len = plain_text_len(value);
    if len < LESSON_CONTENT_MIN {
        return Err(ValidationError::new("content_too_short").with_message(Cow::Owned(format!(
            "must contain at least {LESSON_CONTENT_MIN} characters of text"
        ))));
    }
    if len > LESSON_CONTENT_MAX {
        return Err(ValidationError::new("content_too_long").with_message(Cow::Owned(format!(
            "must contain at most {LESSON_CONTENT_MAX} characters of text"
        ))));
    }
    Ok(())
}

/// Character count of rich-text content once tags are removed and the result trimmed.
/// An HTML entity such as `&nbsp;` counts as a single character. A `&` or `<` that does
/// not open an entity or a tag is ordinary text.
pub fn plain_text_len(html: &str) -> usize {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(c) = rest.chars().next() {
        let markup = match c {
            '<' => tag_len(rest),
            '&' => entity_len(rest).inspect(|_| text.push(' ')),
            _ => None,
        };
        match markup {
            Some(len) => rest = &rest[len..],
            None => {
                text.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    text.trim().chars().count()
}

/// Byte length of the tag at the start of `s`: `<` then a name, `/`, `!` or `?`, up to `>`.
fn tag_len(s: &str) -> Option<usize> {
    let next = s[1..].chars().next()?;
    if !(next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?')) {
        return None;
    }
    s.find('>').map(|end| end + 1)
}

/// Byte length of the entity at the start of `s`, e.g. `&amp;` or `&#8212;`.
fn entity_len(s: &str) -> Option<usize> {
    let end = s.find(';')?;
    let name = &s[1..end];
    let name = name.strip_prefix('#').unwrap_or(name);
    let valid = !name.is_empty() && name.len() <= 32 && name.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(end + 1)
}

/// Validation failures keyed by field path, e.g. `modules[0].lessons[1].content`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Fold `other` in, prefixing each of its paths with `prefix.`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0
                .entry(format!("{prefix}.{field}"))
                .or_default()
                .extend(messages);
        }
    }

    /// Runs `validate` and flattens the outcome.
    pub fn check(result: Result<(), ValidationErrors>) -> Self {
        match result {
            Ok(()) => Self::default(),
            Err(errors) => Self::from(&errors),
        }
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        collect("", errors, &mut out);
        out
    }
}

fn collect(prefix: &str, errors: &ValidationErrors, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    out.add(path.clone(), describe(error));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "required" => "is required".to_string(),
        "length" => "has an invalid length".to_string(),
        "url" => "must be a valid URL".to_string(),
        "email" => "must be a valid email".to_string(),
        "range" => "is out of range".to_string(),
        other => other.to_string(),
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}
