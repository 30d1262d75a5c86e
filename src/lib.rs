pub use crate::diagnostics::{ErrorContext, GenError};

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod engine;
pub mod output;
pub mod template;
