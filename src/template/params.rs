//! Arity parameter synthesis.
//!
//! `synthesize(n)` builds the placeholder values for a macro taking `n` parameters.
//! Parameters are named `a0..a(n-1)` with types `arg0_type..arg(n-1)_type`. Every
//! list has a `coma_` variant that is either empty or starts with `, `, so templates
//! can splice it after a fixed prefix without emitting a separator conditionally.

use std::collections::BTreeMap;

/// Placeholder name to substitution value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    values: BTreeMap<String, String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding only the `arity` key. Used to spell family names.
    pub fn arity_only(arity: impl Into<String>) -> Self {
        let mut set = Self::new();
        set.insert("arity", arity);
        set
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// The expression forwarding `name` by its declared type.
fn forward(ty: &str, name: &str) -> String {
    format!("std::forward<{}>({})", ty, name)
}

fn coma(list: &str) -> String {
    if list.is_empty() {
        String::new()
    } else {
        format!(", {}", list)
    }
}

/// Builds the parameter set for arity `n`. Pure and total.
pub fn synthesize(n: usize) -> ParameterSet {
    let names: Vec<String> = (0..n).map(|i| format!("a{}", i)).collect();
    let types: Vec<String> = (0..n).map(|i| format!("arg{}_type", i)).collect();
    let pairs = || types.iter().zip(names.iter());

    let args = names.join(", ");
    let arg_types = types.join(", ");
    let args_signature = pairs()
        .map(|(ty, name)| format!("{} {}", ty, name))
        .collect::<Vec<_>>()
        .join(", ");
    let flat_pairs = pairs()
        .map(|(ty, name)| format!("{}, {}", ty, name))
        .collect::<Vec<_>>()
        .join(", ");
    let fwd_args = pairs()
        .map(|(ty, name)| forward(ty, name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut set = ParameterSet::new();
    set.insert("arity", n.to_string());
    set.insert("args_coma", coma(&flat_pairs));
    set.insert("coma_args", coma(&args));
    set.insert("coma_arg_types", coma(&arg_types));
    set.insert("coma_args_signature", coma(&args_signature));
    set.insert("coma_fwd_args", coma(&fwd_args));
    set.insert("args", args);
    set.insert("arg_types", arg_types);
    set.insert("args_signature", args_signature);
    set.insert("fwd_args", fwd_args);
    set
}
