//! Short aliases for every per-arity macro.
//!
//! Each template line names a family with `%{arity}` where the suffix goes. The short
//! name is the line with every abbreviation rule applied in declaration order, each
//! rule replacing the first occurrence of its `from` text. The long name gets `_`
//! in front of the arity. For `DYNAMIX_V1_CONST_MESSAGE%{arity}` and arity 2:
//!
//! ```text
//! #define C_MSG2 DYNAMIX_V1_CONST_MESSAGE_2
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ArityRange, Artifact};
use crate::template::{synthesize, Template};
use crate::GenError;

/// Replaces the first occurrence of `from` with `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationRule {
    pub from: String,
    pub to: String,
}

impl AbbreviationRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        if self.from.is_empty() {
            return text.to_string();
        }
        text.replacen(&self.from, &self.to, 1)
    }
}

/// Rules applied as a sequential fold; later rules see earlier rules' output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbbreviationTable {
    rules: Vec<AbbreviationRule>,
}

impl AbbreviationTable {
    pub fn new(rules: Vec<AbbreviationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[AbbreviationRule] {
        &self.rules
    }

    pub fn shorten(&self, name: &str) -> String {
        self.rules
            .iter()
            .fold(name.to_string(), |acc, rule| rule.apply(&acc))
    }

    /// The message-macro abbreviations.
    pub fn message_defaults() -> Self {
        Self::new(vec![
            AbbreviationRule::new("DYNAMIX_V1_", ""),
            AbbreviationRule::new("MESSAGE", "MSG"),
            AbbreviationRule::new("CONST", "C"),
            AbbreviationRule::new("MULTICAST", "MULTI"),
            AbbreviationRule::new("EXPORTED", "X"),
            AbbreviationRule::new("OVERLOAD", "OVLD"),
            AbbreviationRule::new("WITH_DEFAULT_IMPL", "IMPL"),
            AbbreviationRule::new("DEFINE", "DEF"),
        ])
    }
}

/// Emits one alias per template line and arity, template-major, then `trailer` if set.
pub fn emit(
    file_name: &str,
    template: &Template,
    table: &AbbreviationTable,
    range: ArityRange,
    trailer: Option<&str>,
) -> Result<Artifact, GenError> {
    let mut artifact = Artifact::new(file_name);
    artifact.push_line("#pragma once");
    artifact.push_line("");
    let mut count = 0;
    for line in template.lines()? {
        let short = table.shorten(line.text());
        let long = line.text().replacen("%{arity}", "_%{arity}", 1);
        let alias = Template::parse(line.name(), format!("#define {} {}", short, long))?;
        for n in range.ascending() {
            artifact.push_line(alias.expand(&synthesize(n))?);
            count += 1;
        }
    }
    if let Some(trailer) = trailer {
        artifact.push_line(trailer);
    }
    debug!(artifact = file_name, aliases = count, "emitted short aliases");
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_fold_in_order() {
        let table = AbbreviationTable::new(vec![
            AbbreviationRule::new("MESSAGE", "MSG"),
            AbbreviationRule::new("MSG", "M"),
        ]);
        assert_eq!(table.shorten("MESSAGE"), "M");
        let reversed = AbbreviationTable::new(vec![
            AbbreviationRule::new("MSG", "M"),
            AbbreviationRule::new("MESSAGE", "MSG"),
        ]);
        assert_eq!(reversed.shorten("MESSAGE"), "MSG");
    }

    #[test]
    fn rule_replaces_first_occurrence_only() {
        let rule = AbbreviationRule::new("CONST", "C");
        assert_eq!(rule.apply("CONST_CONST"), "C_CONST");
        assert_eq!(AbbreviationRule::new("", "X").apply("abc"), "abc");
    }

    #[test]
    fn default_table_shortens_message_names() {
        let table = AbbreviationTable::message_defaults();
        assert_eq!(
            table.shorten("DYNAMIX_V1_CONST_MULTICAST_MESSAGE%{arity}"),
            "C_MULTI_MSG%{arity}"
        );
        assert_eq!(
            table.shorten("DYNAMIX_V1_EXPORTED_MESSAGE%{arity}_OVERLOAD"),
            "X_MSG%{arity}_OVLD"
        );
    }

    #[test]
    fn emits_template_major_then_trailer() {
        let t = Template::parse("short", "DYNAMIX_V1_MESSAGE%{arity}\nDYNAMIX_V1_CONST_MESSAGE%{arity}\n")
            .unwrap();
        let artifact = emit(
            "short.ipp",
            &t,
            &AbbreviationTable::message_defaults(),
            ArityRange::new(1),
            Some("#define DEF_MSG DYNAMIX_DEFINE_MESSAGE"),
        )
        .unwrap();
        assert_eq!(
            artifact.lines(),
            &[
                "#pragma once",
                "",
                "#define MSG0 DYNAMIX_V1_MESSAGE_0",
                "#define MSG1 DYNAMIX_V1_MESSAGE_1",
                "#define C_MSG0 DYNAMIX_V1_CONST_MESSAGE_0",
                "#define C_MSG1 DYNAMIX_V1_CONST_MESSAGE_1",
                "#define DEF_MSG DYNAMIX_DEFINE_MESSAGE",
            ]
        );
    }
}
