//! `#undef` directives for every per-arity macro, family-major then arity ascending.

use tracing::debug;

use super::{ArityRange, Artifact};
use crate::template::{synthesize, Template};
use crate::GenError;

pub fn emit(file_name: &str, template: &Template, range: ArityRange) -> Result<Artifact, GenError> {
    let mut artifact = Artifact::new(file_name);
    for family in template.lines()? {
        for n in range.ascending() {
            artifact.push_line(format!("#undef {}", family.expand(&synthesize(n))?));
        }
    }
    debug!(
        artifact = file_name,
        directives = artifact.lines().len(),
        "emitted undefine set"
    );
    Ok(artifact)
}
