//! # Shared test support
//!
//! A minimal function-like-macro expander, enough to run the generated dispatch and
//! alias layers the way a preprocessor would, plus fixture helpers.
//!
//! Supported: object-like and function-like `#define`s, `\` continuations, `...` with
//! `__VA_ARGS__`, and rescanning of replacement text. Not supported: `#`, `##`, and
//! recursion guards (none of the generated macros refer to themselves).

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const MAX_EXPANSION_STEPS: usize = 256;

#[derive(Debug, Clone)]
pub struct Define {
    pub params: Option<Vec<String>>,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    defs: HashMap<String, Define>,
}

impl MacroTable {
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();
        table.add_source(text);
        table
    }

    /// Adds every `#define` in `text`; `#undef` removes.
    pub fn add_source(&mut self, text: &str) {
        let joined = text.replace("\\\n", " ");
        for line in joined.lines().map(str::trim) {
            if let Some(name) = line.strip_prefix("#undef ") {
                self.defs.remove(name.trim());
                continue;
            }
            let Some(rest) = line.strip_prefix("#define ") else {
                continue;
            };
            let name_end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
            let name = rest[..name_end].to_string();
            let after = &rest[name_end..];
            let define = match after.strip_prefix('(') {
                Some(inner) => {
                    let close = inner.find(')').expect("unterminated parameter list");
                    let params = inner[..close]
                        .split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect();
                    Define {
                        params: Some(params),
                        body: inner[close + 1..].trim().to_string(),
                    }
                }
                None => Define {
                    params: None,
                    body: after.trim().to_string(),
                },
            };
            self.defs.insert(name, define);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Define> {
        self.defs.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    /// Expands `input` until no defined macro is left to expand.
    pub fn expand(&self, input: &str) -> String {
        let mut text = input.to_string();
        for _ in 0..MAX_EXPANSION_STEPS {
            match self.expand_once(&text) {
                Some(next) => text = next,
                None => return text.trim().to_string(),
            }
        }
        panic!("expansion of '{}' did not terminate", input);
    }

    fn expand_once(&self, text: &str) -> Option<String> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut i = 0;
        while i < chars.len() {
            let (start, c) = chars[i];
            if !(c.is_ascii_alphabetic() || c == '_') {
                i += 1;
                continue;
            }
            let mut j = i;
            while j < chars.len() && is_ident_char(chars[j].1) {
                j += 1;
            }
            let end = chars.get(j).map(|(b, _)| *b).unwrap_or(text.len());
            let ident = &text[start..end];
            if let Some(def) = self.defs.get(ident) {
                match &def.params {
                    None => {
                        return Some(format!("{}{}{}", &text[..start], def.body, &text[end..]));
                    }
                    Some(params) => {
                        let open = text[end..]
                            .find(|c: char| !c.is_whitespace())
                            .map(|off| end + off);
                        if let Some(open) = open.filter(|&o| text[o..].starts_with('(')) {
                            let (args, after) = split_args(text, open);
                            let replaced = substitute(&def.body, params, &args);
                            return Some(format!("{}{}{}", &text[..start], replaced, &text[after..]));
                        }
                    }
                }
            }
            i = j;
        }
        None
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits the parenthesized argument list opening at byte `open`. Returns the trimmed
/// arguments and the byte index just past the closing parenthesis.
pub fn split_args(text: &str, open: usize) -> (Vec<String>, usize) {
    let mut depth = 0;
    let mut args = Vec::new();
    let mut current = String::new();
    for (off, c) in text[open..].char_indices() {
        match c {
            '(' => {
                depth += 1;
                if depth > 1 {
                    current.push(c);
                }
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    args.push(current.trim().to_string());
                    return (args, open + off + 1);
                }
                current.push(c);
            }
            ',' if depth == 1 => args.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    panic!("unbalanced argument list in '{}'", &text[open..]);
}

fn substitute(body: &str, params: &[String], args: &[String]) -> String {
    let variadic = params.last().map(|p| p == "...").unwrap_or(false);
    let fixed = if variadic { params.len() - 1 } else { params.len() };
    assert!(
        args.len() >= fixed,
        "macro with {} parameters invoked with {} arguments",
        fixed,
        args.len()
    );
    let mut bindings: HashMap<&str, String> = params[..fixed]
        .iter()
        .map(String::as_str)
        .zip(args.iter().cloned())
        .collect();
    if variadic {
        bindings.insert("__VA_ARGS__", args[fixed..].join(", "));
    }

    let mut out = String::with_capacity(body.len());
    let mut ident = String::new();
    for c in body.chars().chain(std::iter::once(' ')) {
        if is_ident_char(c) && !(ident.is_empty() && c.is_ascii_digit()) {
            ident.push(c);
            continue;
        }
        if !ident.is_empty() {
            match bindings.get(ident.as_str()) {
                Some(value) => out.push_str(value),
                None => out.push_str(&ident),
            }
            ident.clear();
        }
        out.push(c);
    }
    out.pop();
    out
}

/// Name of a `#define` line, or `None` for other lines.
pub fn defined_name(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("#define ")?;
    let end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// The demo project shipped with the crate.
pub fn demo_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demo")
}

/// Copies `src` recursively into `dst`.
pub fn copy_dir(src: &Path, dst: &Path) {
    for entry in WalkDir::new(src) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(src).unwrap();
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).unwrap();
        } else {
            std::fs::copy(entry.path(), &target).unwrap();
        }
    }
}

/// A scratch copy of the demo project without any generated output.
pub fn demo_copy() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&demo_dir(), dir.path());
    let _ = std::fs::remove_dir_all(dir.path().join("gen"));
    dir
}
