//! The emission passes.
//!
//! Each pass is a pure function from templates and configuration to an [`Artifact`].
//! Passes never read each other's output; the only link between them is the arity
//! pass naming the dispatch artifact in its trailing `#include`.
//!
//! - [`arity`]: one template expansion per arity
//! - [`dispatch`]: the variadic "count the arguments, pick the macro" layer
//! - [`alias`]: abbreviated names for every per-arity macro
//! - [`undef`]: `#undef` for every per-arity macro
//! - [`umbrella`]: a single file including the others

use std::fmt;

pub mod alias;
pub mod arity;
pub mod dispatch;
pub mod umbrella;
pub mod undef;

pub use alias::{AbbreviationRule, AbbreviationTable};

/// The closed interval `[0, max]` every pass iterates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArityRange {
    max: usize,
}

impl ArityRange {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Number of arities covered, `max + 1`.
    pub fn len(&self) -> usize {
        self.max + 1
    }

    /// Always false; the range contains at least arity 0.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn ascending(&self) -> impl DoubleEndedIterator<Item = usize> {
        0..=self.max
    }

    pub fn descending(&self) -> impl Iterator<Item = usize> {
        self.ascending().rev()
    }
}

impl fmt::Display for ArityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0, {}]", self.max)
    }
}

/// The ordered lines one pass produces for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    file_name: String,
    lines: Vec<String>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            lines: Vec::new(),
        }
    }

    /// Destination file name, relative to the output directory.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Appends multi-line text, one entry per line. A single trailing newline does not
    /// produce an empty last line.
    pub fn push_block(&mut self, text: &str) {
        let text = text.strip_suffix('\n').unwrap_or(text);
        self.lines.extend(text.split('\n').map(str::to_string));
    }

    /// Appends an `#include` of another artifact.
    pub fn push_include(&mut self, file_name: &str) {
        self.push_line(format!("#include \"{}\"", file_name));
    }

    /// The file contents: `banner` followed by every line, newline terminated.
    pub fn render(&self, banner: &str) -> String {
        let mut out = String::with_capacity(banner.len() + self.lines.len() * 48);
        out.push_str(banner);
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
