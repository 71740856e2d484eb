//! URL template grammar.
//!
//! One parser serves both sides of a route: the generator uses it to count
//! and name placeholders, [`RouteTable`](super::RouteTable) compiles the same
//! parts into its matching regex.
//!
//! Accepted forms:
//!
//! - `{name}` matches one segment, anywhere inside a segment (`/files/{id}.json`)
//! - `{name=shelves/*}` matches the written segments, `*` is one segment and
//!   `**` any number of them; the variable captures the whole match
//! - `:name` and `*name` as a whole segment match one segment and the rest of
//!   the path respectively
//!
//! A `:` or `*` that does not open a segment is literal text, so custom verbs
//! such as `/items:batchGet` route as written.

use std::fmt;

/// Piece of a variable pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    Literal(String),
    /// `*`
    Single,
    /// `**`
    Multi,
}

/// Piece of a parsed URL template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Variable {
        name: String,
        segments: Vec<PatternSegment>,
    },
}

/// A URL template the router cannot compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Templates start with `/`
    NotAbsolute,
    /// `{` without a matching `}`
    Unclosed { position: usize },
    /// `}` without an opening `{`
    Unopened { position: usize },
    InvalidName { name: String },
    InvalidPattern { name: String, pattern: String },
    /// The compiled regex was rejected
    Regex { detail: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::NotAbsolute => write!(f, "template must start with '/'"),
            TemplateError::Unclosed { position } => {
                write!(f, "unclosed '{{' at byte {position}")
            }
            TemplateError::Unopened { position } => {
                write!(f, "unexpected '}}' at byte {position}")
            }
            TemplateError::InvalidName { name } => {
                write!(f, "invalid variable name '{name}'")
            }
            TemplateError::InvalidPattern { name, pattern } => {
                write!(f, "invalid pattern '{pattern}' for variable '{name}'")
            }
            TemplateError::Regex { detail } => write!(f, "template regex rejected: {detail}"),
        }
    }
}

impl std::error::Error for TemplateError {}

fn is_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn parse_pattern(name: &str, pattern: &str) -> Result<Vec<PatternSegment>, TemplateError> {
    let invalid = || TemplateError::InvalidPattern {
        name: name.to_string(),
        pattern: pattern.to_string(),
    };
    pattern
        .split('/')
        .map(|piece| match piece {
            "*" => Ok(PatternSegment::Single),
            "**" => Ok(PatternSegment::Multi),
            "" => Err(invalid()),
            lit if lit.contains(['*', ':']) => Err(invalid()),
            lit => Ok(PatternSegment::Literal(lit.to_string())),
        })
        .collect()
}

fn flush(literal: &mut String, parts: &mut Vec<TemplatePart>) {
    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(std::mem::take(literal)));
    }
}

/// Split a URL template into literal text and variables.
///
/// ```rust
/// use protoroute::runtime::{parse_template, placeholder_names};
/// let parts = parse_template("/v1/{name=shelves/*}/books/:book").unwrap();
/// assert_eq!(placeholder_names(&parts), vec!["name", "book"]);
/// ```
pub fn parse_template(template: &str) -> Result<Vec<TemplatePart>, TemplateError> {
    if !template.starts_with('/') {
        return Err(TemplateError::NotAbsolute);
    }
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut rest = template;
    while let Some(c) = rest.chars().next() {
        let position = template.len() - rest.len();
        match c {
            '{' => {
                let close = rest.find('}').ok_or(TemplateError::Unclosed { position })?;
                let inner = &rest[1..close];
                if inner.contains('{') {
                    return Err(TemplateError::Unclosed { position });
                }
                let (name, pattern) = match inner.split_once('=') {
                    Some((name, pattern)) => (name.trim(), Some(pattern.trim())),
                    None => (inner.trim(), None),
                };
                if !is_variable_name(name) {
                    return Err(TemplateError::InvalidName {
                        name: name.to_string(),
                    });
                }
                let segments = match pattern {
                    Some(pattern) => parse_pattern(name, pattern)?,
                    None => vec![PatternSegment::Single],
                };
                flush(&mut literal, &mut parts);
                parts.push(TemplatePart::Variable {
                    name: name.to_string(),
                    segments,
                });
                rest = &rest[close + 1..];
            }
            '}' => return Err(TemplateError::Unopened { position }),
            ':' | '*' if literal.ends_with('/') => {
                let end = rest.find('/').unwrap_or(rest.len());
                let name = &rest[1..end];
                if is_variable_name(name) {
                    flush(&mut literal, &mut parts);
                    let segment = if c == ':' {
                        PatternSegment::Single
                    } else {
                        PatternSegment::Multi
                    };
                    parts.push(TemplatePart::Variable {
                        name: name.to_string(),
                        segments: vec![segment],
                    });
                    rest = &rest[end..];
                } else {
                    literal.push(c);
                    rest = &rest[1..];
                }
            }
            _ => {
                literal.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    flush(&mut literal, &mut parts);
    Ok(parts)
}

/// Variable names in order of appearance
#[must_use]
pub fn placeholder_names(parts: &[TemplatePart]) -> Vec<String> {
    parts
        .iter()
        .filter_map(|part| match part {
            TemplatePart::Variable { name, .. } => Some(name.clone()),
            TemplatePart::Literal(_) => None,
        })
        .collect()
}

/// Anchored regex source with one capture group per variable
#[must_use]
pub fn template_pattern(parts: &[TemplatePart]) -> String {
    let mut pattern = String::from("^");
    for part in parts {
        match part {
            TemplatePart::Literal(text) => pattern.push_str(&regex::escape(text)),
            TemplatePart::Variable { segments, .. } => {
                let inner: Vec<String> = segments
                    .iter()
                    .map(|segment| match segment {
                        PatternSegment::Literal(text) => regex::escape(text),
                        PatternSegment::Single => "[^/]+".to_string(),
                        PatternSegment::Multi => ".+".to_string(),
                    })
                    .collect();
                pattern.push('(');
                pattern.push_str(&inner.join("/"));
                pattern.push(')');
            }
        }
    }
    pattern.push('$');
    pattern
}
