//! Templates and the store they are loaded from.
//!
//! A template is immutable text with `%{name}` placeholders. It is parsed once into
//! segments, so a malformed placeholder is reported when the file is loaded and an
//! unknown key is reported at expansion, with the placeholder's span either way.
//!
//! - `%{name}` substitutes the value of `name` from a [`ParameterSet`]
//! - `%%` is a literal `%`
//! - any other `%` is copied through unchanged

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::diagnostics::{to_error_source, SourceArc};
use crate::{err_ctx, GenError};

pub mod params;

pub use params::{synthesize, ParameterSet};

/// A byte range into a template source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { name: String, span: Span },
}

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    text: String,
    segments: Vec<Segment>,
    source: SourceArc,
}

impl Template {
    /// Parses `text`. `name` is used in diagnostics only.
    pub fn parse(name: impl Into<String>, text: impl Into<String>) -> Result<Self, GenError> {
        let name = name.into();
        let text = text.into();
        let source = to_error_source(&name, &text);
        let segments = parse_segments(&text, &source)?;
        Ok(Self {
            name,
            text,
            segments,
            source,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw, unexpanded text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder names in order of appearance (duplicates included).
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder from `params`.
    ///
    /// Fails on the first placeholder that has no key in `params`.
    pub fn expand(&self, params: &ParameterSet) -> Result<String, GenError> {
        let mut out = String::with_capacity(self.text.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { name, span } => match params.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        return Err(err_ctx!(
                            Template,
                            format!("placeholder '{}' has no value", name),
                            &self.source,
                            *span,
                            format!("available keys: {}", params.keys().collect::<Vec<_>>().join(", "))
                        ))
                    }
                },
            }
        }
        Ok(out)
    }

    /// Splits the template into trimmed, non-blank lines, each parsed as its own template.
    ///
    /// Line templates keep spans relative to the line, and are named `<name>:<line>`.
    pub fn lines(&self) -> Result<Vec<Template>, GenError> {
        self.text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| Template::parse(format!("{}:{}", self.name, i + 1), line.trim()))
            .collect()
    }

    pub(crate) fn source(&self) -> &SourceArc {
        &self.source
    }
}

fn parse_segments(text: &str, source: &SourceArc) -> Result<Vec<Segment>, GenError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = text;
    let mut offset = 0;

    while let Some(pos) = rest.find('%') {
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if let Some(tail) = after.strip_prefix('%') {
            literal.push('%');
            offset += pos + 2;
            rest = tail;
        } else if let Some(body) = after.strip_prefix('{') {
            let start = offset + pos;
            let Some(close) = body.find('}') else {
                return Err(err_ctx!(
                    Template,
                    "unterminated placeholder",
                    source,
                    Span {
                        start,
                        end: text.len()
                    },
                    "close the placeholder with '}' or write '%%' for a literal '%'"
                ));
            };
            let name = &body[..close];
            let span = Span {
                start,
                end: start + close + 3,
            };
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(err_ctx!(
                    Template,
                    format!("invalid placeholder name '{}'", name),
                    source,
                    span,
                    "placeholder names are made of letters, digits and '_'"
                ));
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Placeholder {
                name: name.to_string(),
                span,
            });
            offset = span.end;
            rest = &body[close + 1..];
        } else {
            literal.push('%');
            offset += pos + 1;
            rest = after;
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

// =============================
// Template Store
// =============================

/// Loads template documents from a directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads and parses the template stored at `name`, relative to the store root.
    pub fn load(&self, name: &str) -> Result<Template, GenError> {
        let path = self.root.join(name);
        let text = std::fs::read_to_string(&path).map_err(|e| {
            let help = match self.discover() {
                Ok(found) if !found.is_empty() => {
                    format!("templates found in '{}': {}", self.root.display(), found.join(", "))
                }
                _ => format!("no templates found in '{}'", self.root.display()),
            };
            GenError::io("read template", &path, e, help)
        })?;
        debug!(template = name, bytes = text.len(), "loaded template");
        Template::parse(name, text)
    }

    /// Lists every file below the store root, relative and sorted.
    pub fn discover(&self) -> Result<Vec<String>, GenError> {
        let mut found = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|e| {
                GenError::Io {
                    message: format!("failed to walk '{}': {}", self.root.display(), e),
                    ctx: crate::ErrorContext::none(),
                    source: Some(Box::new(e)),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            found.push(rel.to_string_lossy().replace('\\', "/"));
        }
        found.sort();
        Ok(found)
    }
}
