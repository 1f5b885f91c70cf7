//! # Placeholder Substitution
//!
//! Dispute templates and data mappings are JSON documents whose string leaves
//! may reference context values with `{{ path }}` or `{{{ path }}}`. Both forms
//! resolve the same way; nothing is HTML-escaped.
//!
//! A string made of exactly one placeholder takes the referenced JSON value
//! as-is, so `"{{ amount }}"` can become a number or an object. Placeholders
//! embedded in surrounding text are replaced by the value's text form.
//!
//! Rendering walks the parsed document rather than the raw text, so values
//! containing quotes or braces cannot change the document's structure.
//! Rendering either resolves every placeholder or fails.
//!
//! ```rust
//! use serde_json::json;
//! use verdict_engine::template::render_value;
//! use verdict_types::DataContext;
//!
//! let mut context = DataContext::new();
//! context.insert("disputeID", json!(42));
//! context.insert("escrow", json!({ "amount": "1.5", "parties": ["0xaa", "0xbb"] }));
//!
//! let template = json!({
//!     "title": "Escrow dispute #{{ disputeID }}",
//!     "amount": "{{{ escrow.amount }}}",
//!     "parties": "{{ escrow.parties }}"
//! });
//! let rendered = render_value(&template, &context)?;
//! assert_eq!(rendered["title"], "Escrow dispute #42");
//! assert_eq!(rendered["amount"], "1.5");
//! assert_eq!(rendered["parties"], json!(["0xaa", "0xbb"]));
//! # Ok::<(), verdict_engine::TemplateError>(())
//! ```

use serde_json::{Map, Value};
use verdict_types::DataContext;
use verdict_util::{format_json_value, select_path};

use crate::error::TemplateError;

/// Substitute every placeholder in `template` from `context`.
///
/// Object keys are left untouched. Fails with the full list of unresolved
/// placeholders (or malformed fragments) instead of returning a partial
/// document.
pub fn render_value(template: &Value, context: &DataContext) -> Result<Value, TemplateError> {
    let scope = Scope::new(context);
    let mut issues = Issues::default();
    let rendered = render_node(template, &scope, &mut issues);
    issues.into_result(rendered)
}

/// Distinct placeholder paths, in the order rendering visits them.
pub fn placeholders(template: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_placeholders(template, &mut found);
    found
}

fn collect_placeholders(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            for segment in split_segments(text) {
                if let Segment::Placeholder(path) = segment
                    && !found.iter().any(|existing| existing == path)
                {
                    found.push(path.to_string());
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_placeholders(item, found)),
        Value::Object(map) => map.values().for_each(|item| collect_placeholders(item, found)),
        _ => {}
    }
}

/// Lookup view over the context: exact keys first, then nested paths.
struct Scope<'a> {
    context: &'a DataContext,
    document: Value,
}

impl<'a> Scope<'a> {
    fn new(context: &'a DataContext) -> Self {
        Self {
            context,
            document: context.to_json(),
        }
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        self.context.get(path).or_else(|| select_path(&self.document, path))
    }
}

#[derive(Default)]
struct Issues {
    unresolved: Vec<String>,
    malformed: Vec<String>,
}

impl Issues {
    fn unresolved(&mut self, path: &str) {
        if !self.unresolved.iter().any(|existing| existing == path) {
            self.unresolved.push(path.to_string());
        }
    }

    fn into_result(self, rendered: Value) -> Result<Value, TemplateError> {
        if !self.malformed.is_empty() {
            return Err(TemplateError::Malformed { fragments: self.malformed });
        }
        if !self.unresolved.is_empty() {
            return Err(TemplateError::Unresolved {
                placeholders: self.unresolved,
            });
        }
        Ok(rendered)
    }
}

fn render_node(value: &Value, scope: &Scope<'_>, issues: &mut Issues) -> Value {
    match value {
        Value::String(text) => render_str(text, scope, issues),
        Value::Array(items) => Value::Array(items.iter().map(|item| render_node(item, scope, issues)).collect()),
        Value::Object(map) => {
            let mut rendered = Map::with_capacity(map.len());
            for (key, item) in map {
                rendered.insert(key.clone(), render_node(item, scope, issues));
            }
            Value::Object(rendered)
        }
        _ => value.clone(),
    }
}

fn render_str(text: &str, scope: &Scope<'_>, issues: &mut Issues) -> Value {
    let segments = split_segments(text);
    if segments.iter().all(|segment| matches!(segment, Segment::Literal(_))) {
        return Value::String(text.to_string());
    }

    if let [Segment::Placeholder(path)] = segments.as_slice() {
        return match scope.lookup(path) {
            Some(value) => value.clone(),
            None => {
                issues.unresolved(path);
                Value::Null
            }
        };
    }

    let mut output = String::with_capacity(text.len());
    for segment in segments {
        match segment {
            Segment::Literal(literal) => output.push_str(literal),
            Segment::Placeholder(path) => match scope.lookup(path) {
                Some(value) => output.push_str(&format_json_value(value)),
                None => issues.unresolved(path),
            },
            Segment::Malformed(fragment) => issues.malformed.push(fragment.to_string()),
        }
    }
    Value::String(output)
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
    Malformed(&'a str),
}

fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        let tag = &rest[open..];
        let (open_len, close) = if tag.starts_with("{{{") { (3, "}}}") } else { (2, "}}") };
        let Some(close_at) = tag[open_len..].find(close) else {
            segments.push(Segment::Malformed(tag));
            return segments;
        };
        let end = open_len + close_at + close.len();
        let path = tag[open_len..open_len + close_at].trim();
        if path.is_empty() || path.contains("{{") {
            segments.push(Segment::Malformed(&tag[..end]));
        } else {
            segments.push(Segment::Placeholder(path));
        }
        rest = &tag[end..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}
