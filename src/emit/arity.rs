//! Arity-indexed expansion: one copy of the template per arity, ascending.

use tracing::debug;

use super::{ArityRange, Artifact};
use crate::template::{synthesize, Template};
use crate::GenError;

/// Expands `template` once for every arity in `range`.
///
/// `preamble` lines come first. When `include` is set, the artifact ends with an
/// `#include` of that file so the two compose at consumption time.
pub fn emit(
    file_name: &str,
    template: &Template,
    range: ArityRange,
    preamble: &[String],
    include: Option<&str>,
) -> Result<Artifact, GenError> {
    let mut artifact = Artifact::new(file_name);
    for line in preamble {
        artifact.push_line(line.as_str());
    }
    for n in range.ascending() {
        let expanded = template.expand(&synthesize(n))?;
        artifact.push_block(&expanded);
    }
    if let Some(include) = include {
        artifact.push_include(include);
    }
    debug!(
        artifact = file_name,
        template = template.name(),
        lines = artifact.lines().len(),
        "emitted arity pass"
    );
    Ok(artifact)
}
