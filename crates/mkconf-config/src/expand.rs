//! `${VAR}` expansion for plugin option strings.
//!
//! - `${VAR}` expands to the value of VAR, errors if unset
//! - `${VAR:-default}` expands to VAR if set, otherwise uses default
//!
//! Strings without `${` are returned verbatim, so tokens containing a bare
//! `$` survive. Once a string contains `${`, bare `$VAR` references in it
//! are expanded as well.

use crate::ConfigError;

/// Expand `${..}` references in `value`, reporting failures against `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand an optional option value.
pub(crate) fn expand_opt(value: Option<String>, field: &str) -> Result<Option<String>, ConfigError> {
    value.map(|v| expand_env(&v, field)).transpose()
}

struct UnsetVar(String);
