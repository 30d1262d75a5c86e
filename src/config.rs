//! Generator configuration.
//!
//! A YAML document deserialized into [`GenConfig`]. Every field has a default, so an empty
//! document describes the message-macro layout: five template files next to the config,
//! an `arity` file holding the maximum arity, and output into `gen/`.
//!
//! ```yaml
//! template_dir: templates
//! output_dir: ../include/gen
//! max_arity: 8            # overrides the arity file
//! aliases:
//!   template: short_message_macros_template
//!   output: short_message_macros.ipp
//!   rules:
//!     - { from: DYNAMIX_V1_, to: "" }
//!     - { from: MESSAGE, to: MSG }
//! ```
//!
//! Relative paths resolve against the directory holding the config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostics::to_error_source;
use crate::emit::dispatch::DispatchStyle;
use crate::emit::AbbreviationTable;
use crate::template::Span;
use crate::{err_ctx, GenError};

pub const DEFAULT_CONFIG_FILE: &str = "aritygen.yaml";

pub const DEFAULT_BANNER: &str = "//\n\
// this file is automatically generated by aritygen\n\
// edit the templates and regenerate instead of editing it by hand\n\
//\n\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    /// File holding the maximum arity. Ignored when `max_arity` is set.
    pub arity_file: PathBuf,
    pub max_arity: Option<usize>,
    /// Written at the top of every artifact.
    pub banner: String,
    pub arity_passes: Vec<ArityPass>,
    pub dispatch: DispatchPass,
    pub aliases: AliasPass,
    pub undef: UndefPass,
    pub umbrella: UmbrellaPass,
}

/// One arity-indexed expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArityPass {
    pub template: String,
    pub output: String,
    /// Lines written before the first expansion.
    #[serde(default)]
    pub preamble: Vec<String>,
    /// End the artifact with an `#include` of the dispatch artifact.
    #[serde(default)]
    pub include_dispatch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchPass {
    pub template: String,
    pub output: String,
    pub proxy_macro: String,
    pub error_marker: String,
    pub selector_prefix: String,
    pub selector_suffix: String,
}

impl DispatchPass {
    pub fn style(&self) -> DispatchStyle {
        DispatchStyle {
            proxy_macro: self.proxy_macro.clone(),
            error_marker: self.error_marker.clone(),
            selector_prefix: self.selector_prefix.clone(),
            selector_suffix: self.selector_suffix.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AliasPass {
    pub template: String,
    pub output: String,
    pub rules: AbbreviationTable,
    /// Appended after every alias, verbatim.
    pub trailer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UndefPass {
    pub template: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UmbrellaPass {
    /// `None` disables the umbrella artifact.
    pub output: Option<String>,
    pub include_undef: bool,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("."),
            output_dir: PathBuf::from("gen"),
            arity_file: PathBuf::from("arity"),
            max_arity: None,
            banner: DEFAULT_BANNER.to_string(),
            arity_passes: vec![
                ArityPass {
                    template: "message_macros_template".to_string(),
                    output: "template_message_macros.ipp".to_string(),
                    preamble: Vec::new(),
                    include_dispatch: true,
                },
                ArityPass {
                    template: "arity_message_macros_template".to_string(),
                    output: "arity_message_macros.ipp".to_string(),
                    preamble: vec![
                        "#include <limits>".to_string(),
                        "#include <type_traits>".to_string(),
                    ],
                    include_dispatch: false,
                },
            ],
            dispatch: DispatchPass::default(),
            aliases: AliasPass::default(),
            undef: UndefPass::default(),
            umbrella: UmbrellaPass::default(),
        }
    }
}

impl Default for DispatchPass {
    fn default() -> Self {
        let style = DispatchStyle::default();
        Self {
            template: "no_arity_message_macros_template".to_string(),
            output: "no_arity_message_macros.ipp".to_string(),
            proxy_macro: style.proxy_macro,
            error_marker: style.error_marker,
            selector_prefix: style.selector_prefix,
            selector_suffix: style.selector_suffix,
        }
    }
}

impl Default for AliasPass {
    fn default() -> Self {
        Self {
            template: "short_message_macros_template".to_string(),
            output: "short_message_macros.ipp".to_string(),
            rules: AbbreviationTable::message_defaults(),
            trailer: Some("#define DEF_MSG DYNAMIX_DEFINE_MESSAGE".to_string()),
        }
    }
}

impl Default for UndefPass {
    fn default() -> Self {
        Self {
            template: "undef_message_macros_template".to_string(),
            output: "undef_message_macros.ipp".to_string(),
        }
    }
}

impl Default for UmbrellaPass {
    fn default() -> Self {
        Self {
            output: Some("message_macros.ipp".to_string()),
            include_undef: false,
        }
    }
}

impl GenConfig {
    /// Parses a YAML document. `name` is used in diagnostics only.
    pub fn from_yaml(name: &str, text: &str) -> Result<Self, GenError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| {
            let span = e
                .location()
                .map(|loc| Span {
                    start: loc.index(),
                    end: loc.index() + 1,
                })
                .unwrap_or_default();
            let src = to_error_source(name, text);
            GenError::Config {
                message: format!("invalid configuration: {}", e),
                ctx: crate::ErrorContext {
                    source: Some(src),
                    span: Some(span),
                    help: Some("see the aritygen.yaml in the demo directory for every key".to_string()),
                },
                source: Some(Box::new(e)),
            }
        })
    }

    /// Reads and parses the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, GenError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GenError::io(
                "read config",
                path,
                e,
                "pass --config with the path of the generator configuration",
            )
        })?;
        debug!(config = %path.display(), "loaded configuration");
        Self::from_yaml(&path.display().to_string(), &text)
    }
}

/// Parses the contents of an arity file: one non-negative integer.
pub fn parse_max_arity(name: &str, text: &str) -> Result<usize, GenError> {
    let trimmed = text.trim();
    let start = text.find(trimmed).unwrap_or(0);
    let span = Span {
        start,
        end: start + trimmed.len(),
    };
    match trimmed.parse::<i64>() {
        Ok(n) if n >= 0 => usize::try_from(n).map_err(|_| {
            err_ctx!(Config, format!("max arity {} is too large", n), &to_error_source(name, text), span)
        }),
        Ok(n) => Err(err_ctx!(
            Config,
            format!("max arity must not be negative, found {}", n),
            &to_error_source(name, text),
            span,
            "arity 0 generates only the parameterless variants"
        )),
        Err(_) => Err(err_ctx!(
            Config,
            format!("max arity '{}' is not an integer", trimmed),
            &to_error_source(name, text),
            span,
            "the arity file holds a single non-negative integer"
        )),
    }
}

/// Reads the arity file at `path`.
pub fn read_max_arity(path: &Path) -> Result<usize, GenError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        GenError::io(
            "read arity file",
            path,
            e,
            "create it with the maximum arity, or set max_arity in the configuration",
        )
    })?;
    parse_max_arity(&path.display().to_string(), &text)
}
