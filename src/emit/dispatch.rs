//! The variadic dispatch layer.
//!
//! For every family line `F%{arity}(fixed..., %{args})` two macros are emitted:
//!
//! ```text
//! #define F(...) \
//!    PROXY(_GET_F_MACRO, (__VA_ARGS__, F_N, ERR, ..., F_1, ERR, F_0, ERR))(__VA_ARGS__)
//! #define _GET_F_MACRO(fixed..., arg0_type, a0, ..., argN-1_type, aN-1, MACRO, ...) MACRO
//! ```
//!
//! The call site's arguments fill the selector's leading slots and push the descending
//! name list to the right, two slots per (type, name) pair, so `MACRO` binds to `F_n`
//! exactly when `n` pairs were passed. An odd count lands on `ERR`. `PROXY` must be
//! defined by the consumer as `#define PROXY(MACRO, args) MACRO args`; the extra
//! expansion step makes the preprocessor split `__VA_ARGS__` before selecting.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{ArityRange, Artifact};
use crate::template::{ParameterSet, Span, Template};
use crate::{err_ctx, err_msg, GenError};

static FAMILY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>[^(]+?)\s*(?P<params>\(.*\))$").expect("valid regex"));

/// Spelling of the helper macros the dispatch layer refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchStyle {
    /// Consumer-provided `PROXY(MACRO, args)` indirection.
    pub proxy_macro: String,
    /// Token selected when the argument count matches no arity.
    pub error_marker: String,
    pub selector_prefix: String,
    pub selector_suffix: String,
}

impl Default for DispatchStyle {
    fn default() -> Self {
        Self {
            proxy_macro: "I_DYNAMIX_VA_ARGS_PROXY".to_string(),
            error_marker: "I_DYNAMIX_MESSAGE_ARG_ERROR".to_string(),
            selector_prefix: "_GET_".to_string(),
            selector_suffix: "_MACRO".to_string(),
        }
    }
}

/// One macro family, parsed from a dispatch template line.
#[derive(Debug, Clone)]
pub struct Family {
    name: Template,
    params: Template,
}

impl Family {
    /// Parses `NAME%{arity}(params...)`. The parameter list must contain `%{args}`, after
    /// at least one fixed parameter: an empty call still passes one (empty) argument, which
    /// would otherwise take the first slot and shift the arity-0 selection.
    pub fn parse(line: &Template) -> Result<Self, GenError> {
        let whole = Span {
            start: 0,
            end: line.text().len(),
        };
        let caps = FAMILY_LINE.captures(line.text()).ok_or_else(|| {
            err_ctx!(
                Template,
                "dispatch line has no parameter list",
                line.source(),
                whole,
                "write the family as NAME%{arity}(fixed, params, %{args})"
            )
        })?;
        let (Some(name), Some(params)) = (caps.name("name"), caps.name("params")) else {
            return Err(err_msg!(
                Internal,
                "family pattern matched '{}' without both captures",
                line.text()
            ));
        };
        let name = Template::parse(line.name(), name.as_str().trim())?;
        let params = Template::parse(line.name(), params.as_str())?;
        if !params.placeholders().any(|p| p == "args") {
            return Err(err_ctx!(
                Template,
                "dispatch parameter list does not contain %{args}",
                line.source(),
                whole,
                "the selector needs %{args} to place the per-arity slots"
            ));
        }
        if params.text()[1..].trim_start().starts_with("%{args}") {
            return Err(err_ctx!(
                Template,
                "dispatch parameter list starts with %{args}",
                line.source(),
                whole,
                "the selector needs at least one fixed parameter before %{args}, e.g. NAME%{arity}(name, %{args})"
            ));
        }
        Ok(Self { name, params })
    }

    /// The unsuffixed public name, `F`.
    pub fn base_name(&self) -> Result<String, GenError> {
        self.name.expand(&ParameterSet::arity_only(""))
    }

    /// The per-arity name, `F_n`.
    pub fn arity_name(&self, n: usize) -> Result<String, GenError> {
        self.name.expand(&ParameterSet::arity_only(format!("_{}", n)))
    }

    pub fn selector_name(&self, style: &DispatchStyle) -> Result<String, GenError> {
        Ok(format!(
            "{}{}{}",
            style.selector_prefix,
            self.base_name()?,
            style.selector_suffix
        ))
    }

    /// `[F_N, ERR, F_N-1, ERR, ..., F_0, ERR]`.
    pub fn descending_list(
        &self,
        range: ArityRange,
        style: &DispatchStyle,
    ) -> Result<Vec<String>, GenError> {
        let mut list = Vec::with_capacity(2 * range.len());
        for n in range.descending() {
            list.push(self.arity_name(n)?);
            list.push(style.error_marker.clone());
        }
        Ok(list)
    }

    /// The selector's formal parameter list with `%{args}` replaced by the slots.
    pub fn selector_params(&self, range: ArityRange) -> Result<String, GenError> {
        let mut slots: Vec<String> = (0..range.max())
            .map(|i| format!("arg{}_type, a{}", i, i))
            .collect();
        slots.push("MACRO".to_string());
        slots.push("...".to_string());
        let mut set = ParameterSet::new();
        set.insert("args", slots.join(", "));
        self.params.expand(&set)
    }

    fn emit_into(
        &self,
        artifact: &mut Artifact,
        range: ArityRange,
        style: &DispatchStyle,
    ) -> Result<(), GenError> {
        let base = self.base_name()?;
        let selector = self.selector_name(style)?;
        let list = self.descending_list(range, style)?.join(", ");
        artifact.push_line(format!("#define {}(...) \\", base));
        artifact.push_line(format!(
            "   {}({}, (__VA_ARGS__, {}))(__VA_ARGS__)",
            style.proxy_macro, selector, list
        ));
        artifact.push_line(format!(
            "#define {}{} MACRO",
            selector,
            self.selector_params(range)?
        ));
        Ok(())
    }
}

/// Parses every non-blank line of `template` as a family.
pub fn families(template: &Template) -> Result<Vec<Family>, GenError> {
    template.lines()?.iter().map(Family::parse).collect()
}

/// Emits the dispatch layer for every family in `template`, in template order.
pub fn emit(
    file_name: &str,
    template: &Template,
    range: ArityRange,
    style: &DispatchStyle,
) -> Result<Artifact, GenError> {
    let families = families(template)?;
    let mut artifact = Artifact::new(file_name);
    artifact.push_line("#pragma once");
    artifact.push_line("");
    for family in &families {
        family.emit_into(&mut artifact, range, style)?;
    }
    debug!(
        artifact = file_name,
        families = families.len(),
        "emitted dispatch layer"
    );
    Ok(artifact)
}
