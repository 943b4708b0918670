//! Secret reference resolution for `config.toml` values.
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the
//!   first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is used verbatim

use std::process::Command;

use thiserror::Error;

/// A secret reference that could not be resolved.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretError {
    /// `pass` could not be run or exited with an error.
    #[error("`pass show {path}` failed: {message}")]
    Pass { path: String, message: String },

    /// `pass` printed nothing.
    #[error("`pass show {path}` produced no output")]
    Empty { path: String },

    /// The referenced environment variable is unset.
    #[error("environment variable `{var}` is not set")]
    Env { var: String },
}

/// Resolves `value`, expanding `pass::` and `env::` references.
pub fn resolve(value: &str) -> Result<String, SecretError> {
    if let Some(path) = value.strip_prefix("pass::") {
        from_pass(path)
    } else if let Some(var) = value.strip_prefix("env::") {
        std::env::var(var).map_err(|_| SecretError::Env {
            var: var.to_string(),
        })
    } else {
        Ok(value.to_string())
    }
}

/// Resolves an optional value; `None` stays `None`.
pub fn resolve_opt(value: Option<&str>) -> Result<Option<String>, SecretError> {
    value.map(resolve).transpose()
}

fn from_pass(path: &str) -> Result<String, SecretError> {
    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| SecretError::Pass {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(SecretError::Pass {
            path: path.to_string(),
            message: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| SecretError::Empty {
            path: path.to_string(),
        })
}
