//! Error types for configuration loading and validation

use std::path::PathBuf;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid configuration:\n{}", format_validation_errors(.0))]
    Validation(#[source] ValidationErrors),

    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Parsing(Box::new(err))
    }
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}

/// Flattens nested validation errors into `path: code` lines.
fn format_validation_errors(errors: &ValidationErrors) -> String {
    use std::fmt::Write;
    use validator::ValidationErrorsKind;

    fn walk(prefix: &str, errors: &ValidationErrors, output: &mut String) {
        for (field, kind) in errors.errors() {
            let path = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", prefix, field)
            };
            match kind {
                ValidationErrorsKind::Field(errors) => {
                    for error in errors {
                        let message = match &error.message {
                            Some(msg) => msg.to_string(),
                            None => error.code.to_string(),
                        };
                        let _ = writeln!(output, "  {}: {}", path, message);
                    }
                }
                ValidationErrorsKind::Struct(inner) => walk(&path, inner, output),
                ValidationErrorsKind::List(items) => {
                    for (index, inner) in items {
                        walk(&format!("{}[{}]", path, index), inner, output);
                    }
                }
            }
        }
    }

    let mut output = String::new();
    walk("", errors, &mut output);
    output
}
