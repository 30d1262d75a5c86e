//! The generation pipeline.
//!
//! [`Generator::run`] reads every input (arity, all templates) up front, then runs the
//! passes in a fixed order and returns the complete artifact set. Nothing is written
//! here; the output writer only ever sees a fully generated set, so a failed expansion
//! leaves every destination untouched.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{read_max_arity, GenConfig, DEFAULT_CONFIG_FILE};
use crate::emit::{alias, arity, dispatch, umbrella, undef, ArityRange, Artifact};
use crate::template::{Template, TemplateStore};
use crate::GenError;

/// A configuration bound to the directory its relative paths resolve against.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GenConfig,
    base_dir: PathBuf,
    max_arity_override: Option<usize>,
}

/// Every input of a run, loaded and parsed.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub range: ArityRange,
    pub arity_templates: Vec<Template>,
    pub dispatch_template: Template,
    pub alias_template: Template,
    pub undef_template: Template,
}

impl Generator {
    pub fn new(config: GenConfig, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            base_dir: base_dir.into(),
            max_arity_override: None,
        }
    }

    /// Loads the configuration at `path`; relative paths in it resolve against its directory.
    pub fn from_config_file(path: &Path) -> Result<Self, GenError> {
        let config = GenConfig::load(path)?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Ok(Self::new(config, base_dir))
    }

    /// Loads `aritygen.yaml` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, GenError> {
        Self::from_config_file(&dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Takes precedence over both `max_arity` and the arity file.
    pub fn with_max_arity(mut self, max_arity: Option<usize>) -> Self {
        self.max_arity_override = max_arity;
        self
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.config.output_dir)
    }

    fn template_store(&self) -> TemplateStore {
        TemplateStore::new(self.base_dir.join(&self.config.template_dir))
    }

    /// Resolves the maximum arity: override, then `max_arity`, then the arity file.
    pub fn max_arity(&self) -> Result<usize, GenError> {
        if let Some(n) = self.max_arity_override.or(self.config.max_arity) {
            return Ok(n);
        }
        read_max_arity(&self.base_dir.join(&self.config.arity_file))
    }

    /// Reads the arity and every template. Fails before any pass runs.
    pub fn load_inputs(&self) -> Result<Inputs, GenError> {
        let max = self.max_arity()?;
        let store = self.template_store();
        let arity_templates = self
            .config
            .arity_passes
            .iter()
            .map(|pass| store.load(&pass.template))
            .collect::<Result<Vec<_>, _>>()?;
        let inputs = Inputs {
            range: ArityRange::new(max),
            arity_templates,
            dispatch_template: store.load(&self.config.dispatch.template)?,
            alias_template: store.load(&self.config.aliases.template)?,
            undef_template: store.load(&self.config.undef.template)?,
        };
        info!(max_arity = max, templates = %store.root().display(), "inputs loaded");
        Ok(inputs)
    }

    /// Runs every pass over `inputs`, in emission order.
    pub fn generate(&self, inputs: &Inputs) -> Result<Vec<Artifact>, GenError> {
        let config = &self.config;
        let range = inputs.range;
        let mut artifacts = Vec::new();

        for (pass, template) in config.arity_passes.iter().zip(&inputs.arity_templates) {
            let include = pass
                .include_dispatch
                .then_some(config.dispatch.output.as_str());
            artifacts.push(arity::emit(
                &pass.output,
                template,
                range,
                &pass.preamble,
                include,
            )?);
        }
        artifacts.push(dispatch::emit(
            &config.dispatch.output,
            &inputs.dispatch_template,
            range,
            &config.dispatch.style(),
        )?);
        artifacts.push(alias::emit(
            &config.aliases.output,
            &inputs.alias_template,
            &config.aliases.rules,
            range,
            config.aliases.trailer.as_deref(),
        )?);
        let undef = undef::emit(&config.undef.output, &inputs.undef_template, range)?;

        if let Some(output) = &config.umbrella.output {
            let members: Vec<&Artifact> = if config.umbrella.include_undef {
                artifacts.iter().chain(std::iter::once(&undef)).collect()
            } else {
                artifacts.iter().collect()
            };
            let all = umbrella::emit(output, members);
            artifacts.push(undef);
            artifacts.push(all);
        } else {
            artifacts.push(undef);
        }

        debug!(artifacts = artifacts.len(), range = %range, "generation complete");
        Ok(artifacts)
    }

    /// Loads the inputs and generates every artifact.
    pub fn run(&self) -> Result<Vec<Artifact>, GenError> {
        let inputs = self.load_inputs()?;
        self.generate(&inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorType;

    fn write_project(dir: &Path, config: &str) {
        std::fs::write(dir.join(DEFAULT_CONFIG_FILE), config).unwrap();
        std::fs::write(dir.join("arity"), "2\n").unwrap();
        std::fs::write(dir.join("decl"), "#define MSG_%{arity}(n%{coma_args_signature}) n\n").unwrap();
        std::fs::write(dir.join("dispatch"), "MSG%{arity}(n, %{args})\n").unwrap();
        std::fs::write(dir.join("short"), "MESSAGE%{arity}\n").unwrap();
        std::fs::write(dir.join("undef"), "MSG_%{arity}\n").unwrap();
    }

    const CONFIG: &str = "\
arity_passes:
  - { template: decl, output: decl.ipp, include_dispatch: true }
dispatch: { template: dispatch, output: dispatch.ipp }
aliases: { template: short, output: short.ipp, rules: [ { from: MESSAGE, to: M } ], trailer: ~ }
undef: { template: undef, output: undef.ipp }
umbrella: { output: all.ipp }
";

    #[test]
    fn generates_in_emission_order() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), CONFIG);
        let artifacts = Generator::from_dir(dir.path()).unwrap().run().unwrap();
        let names: Vec<_> = artifacts.iter().map(|a| a.file_name()).collect();
        assert_eq!(
            names,
            vec!["decl.ipp", "dispatch.ipp", "short.ipp", "undef.ipp", "all.ipp"]
        );
        let all = artifacts.last().unwrap();
        assert_eq!(
            all.lines(),
            &[
                "#pragma once",
                "",
                "#include \"decl.ipp\"",
                "#include \"dispatch.ipp\"",
                "#include \"short.ipp\""
            ]
        );
        assert_eq!(
            artifacts[0].lines().last().map(String::as_str),
            Some("#include \"dispatch.ipp\"")
        );
    }

    #[test]
    fn override_beats_config_and_file() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), &format!("max_arity: 4\n{}", CONFIG));
        let generator = Generator::from_dir(dir.path()).unwrap();
        assert_eq!(generator.max_arity().unwrap(), 4);
        assert_eq!(generator.with_max_arity(Some(1)).max_arity().unwrap(), 1);
    }

    #[test]
    fn missing_template_aborts() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), CONFIG);
        std::fs::remove_file(dir.path().join("short")).unwrap();
        let err = Generator::from_dir(dir.path()).unwrap().run().unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Io);
    }

    #[test]
    fn missing_config_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = Generator::from_dir(dir.path()).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Io);
    }
}
