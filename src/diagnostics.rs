//!
//! # Overview
//!
//! This module defines the unified, `miette`-based diagnostic system for the generator. Every
//! failure produced while loading inputs, expanding templates, or writing artifacts is a
//! [`GenError`]. Construction goes through the `err_msg!` and `err_ctx!` macros.
//!
//! # Error Construction Macros
//!
//! - **Use `err_msg!` for simple, message-only errors.**
//!   - `err_msg!(Config, "max arity must be a non-negative integer")`
//!
//! - **Use `err_ctx!` for errors tied to a template or config source.**
//!   - `err_ctx!(Template, "unknown placeholder", src, span)`
//!   - `err_ctx!(Template, "unknown placeholder", src, span, help)`
//!
//! # Rules
//!
//! - Nothing is recovered locally. Every error is surfaced to the invoker, which aborts the run.
//! - Pass `src` as a [`SourceArc`] and `span` as a [`Span`]; the macros clone and wrap.
//! - Attach a help line whenever the fix is knowable (a missing file, a typo'd key).

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::template::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Type-safe error classification that corresponds to the `GenError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Bad or inconsistent configuration (arity value, config document)
    Config,
    /// Missing or unreadable input, or a failed write
    Io,
    /// Malformed template or a placeholder with no synthesized key
    Template,
    /// Generator bugs
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Config => "config",
            ErrorType::Io => "io",
            ErrorType::Template => "template",
            ErrorType::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The primary source for this error (if any).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_help(help: impl Into<String>) -> Self {
        Self {
            source: None,
            span: None,
            help: Some(help.into()),
        }
    }
}

/// Unified error type for every generator failure mode.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Template error: {message}")]
    Template {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl GenError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            GenError::Config { ctx, .. } => ctx,
            GenError::Io { ctx, .. } => ctx,
            GenError::Template { ctx, .. } => ctx,
            GenError::Internal { ctx, .. } => ctx,
        }
    }

    fn message(&self) -> &str {
        match self {
            GenError::Config { message, .. } => message,
            GenError::Io { message, .. } => message,
            GenError::Template { message, .. } => message,
            GenError::Internal { message, .. } => message,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            GenError::Config { .. } => ErrorType::Config,
            GenError::Io { .. } => ErrorType::Io,
            GenError::Template { .. } => ErrorType::Template,
            GenError::Internal { .. } => ErrorType::Internal,
        }
    }

    /// Wraps an `std::io::Error` that occurred while touching `path`.
    pub fn io(
        operation: &str,
        path: &std::path::Path,
        err: std::io::Error,
        help: impl Into<String>,
    ) -> Self {
        GenError::Io {
            message: format!("failed to {} '{}': {}", operation, path.display(), err),
            ctx: ErrorContext::with_help(help),
            source: Some(Box::new(err)),
        }
    }

    /// Replaces (or sets) the help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        let ctx = match &mut self {
            GenError::Config { ctx, .. } => ctx,
            GenError::Io { ctx, .. } => ctx,
            GenError::Template { ctx, .. } => ctx,
            GenError::Internal { ctx, .. } => ctx,
        };
        ctx.help = Some(help.into());
        self
    }
}

impl Diagnostic for GenError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("aritygen::{}", self.error_type())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx();
        // A span without a source has nothing to point into.
        ctx.source.as_ref()?;
        let span = ctx.span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.message().to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Converts a named source string into a [`SourceArc`] for use in error contexts.
pub fn to_error_source(name: impl AsRef<str>, content: impl AsRef<str>) -> SourceArc {
    Arc::new(NamedSource::new(
        name.as_ref().to_string(),
        content.as_ref().to_string(),
    ))
}

/// Constructs a GenError variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $msg:expr, $($arg:expr),+ $(,)?) => {
        $crate::GenError::$variant {
            message: format!($msg, $($arg),+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
    ($variant:ident, $msg:expr) => {
        $crate::GenError::$variant {
            message: format!("{}", $msg),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs a GenError variant with a message, a source, a span and an optional help line.
#[macro_export]
macro_rules! err_ctx {
    // Message, src, span, help
    ($variant:ident, $msg:expr, $src:expr, $span:expr, $help:expr) => {
        $crate::GenError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some($crate::diagnostics::SourceArc::clone($src)),
                span: Some($span),
                help: Some(format!("{}", $help)),
            },
            source: None,
        }
    };
    // Message, src, span
    ($variant:ident, $msg:expr, $src:expr, $span:expr) => {
        $crate::GenError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some($crate::diagnostics::SourceArc::clone($src)),
                span: Some($span),
                help: None,
            },
            source: None,
        }
    };
}
