//! `${VAR}` references in configuration strings.

use std::env::{self, VarError};

use crate::ConfigError;

/// Expand environment references in `value` in place.
///
/// `${VAR}` is replaced by VAR and fails when VAR is unset or not unicode;
/// `${VAR:-fallback}` uses the fallback instead of failing. Bare `$VAR` is
/// left alone. `field` names the value in the returned error.
pub(crate) fn expand_in_place(value: &mut String, field: &str) -> Result<(), ConfigError> {
    if !value.contains("${") {
        return Ok(());
    }

    let expanded = shellexpand::env_with_context(value.as_str(), lookup)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: describe(&e.var_name, &e.cause),
        })?
        .into_owned();
    *value = expanded;
    Ok(())
}

fn lookup(name: &str) -> Result<Option<String>, VarError> {
    env::var(name).map(Some)
}

fn describe(name: &str, cause: &VarError) -> String {
    match cause {
        VarError::NotPresent => format!("${{{name}}} not set"),
        VarError::NotUnicode(_) => format!("${{{name}}} is not valid unicode"),
    }
}
