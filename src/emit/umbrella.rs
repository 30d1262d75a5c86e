//! The umbrella artifact: `#include`s every other artifact in emission order.

use super::Artifact;

pub fn emit<'a>(file_name: &str, members: impl IntoIterator<Item = &'a Artifact>) -> Artifact {
    let mut artifact = Artifact::new(file_name);
    artifact.push_line("#pragma once");
    artifact.push_line("");
    for member in members {
        artifact.push_include(member.file_name());
    }
    artifact
}
