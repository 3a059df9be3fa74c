//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::directive::{parse_directives, DirectiveError};
use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Directive error: {0}")]
    Directive(#[from] DirectiveError),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse config text. TOML when `is_toml`, directive blocks otherwise.
///
/// A directive file only describes routes; every other section keeps its
/// default.
pub fn parse_config(content: &str, is_toml: bool) -> Result<GatewayConfig, ConfigError> {
    let config = if is_toml {
        toml::from_str(content)?
    } else {
        GatewayConfig {
            routes: parse_directives(content)?,
            ..GatewayConfig::default()
        }
    };

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a file.
///
/// Files ending in `.toml` are read as TOML; anything else is read as
/// directive blocks.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let config = parse_config(&content, is_toml)?;
    tracing::debug!(path = %path.display(), routes = config.routes.len(), "Config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let config = parse_config("[[routes]]\npath = \"/fn/\"\n", true).unwrap();
        assert_eq!(config.routes[0].path, "/fn/");
    }

    #[test]
    fn test_parse_directives_keeps_defaults() {
        let config = parse_config("awslambda /fn/ {\n  qualifier prod\n}\n", false).unwrap();
        assert_eq!(config.routes[0].qualifier.as_deref(), Some("prod"));
        assert_eq!(config.listener, GatewayConfig::default().listener);
    }

    #[test]
    fn test_validation_errors_surface() {
        let err = parse_config("awslambda fn/", false).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("must start with `/`"));
    }

    #[test]
    fn test_demo_configs_agree() {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
        let toml = load_config(&demos.join("gateway.toml")).unwrap();
        let blocks = load_config(&demos.join("Lambdafile")).unwrap();

        assert_eq!(toml.routes.len(), 2);
        for (a, b) in toml.routes.iter().zip(&blocks.routes) {
            assert_eq!(a.path, b.path);
            assert_eq!(a.single, b.single);
            assert_eq!(a.endpoint, b.endpoint);
            assert_eq!(a.exclude, b.exclude);
        }
        assert_eq!(
            blocks.routes[0].upstream_headers["X-Forwarded-Host"],
            vec!["{host}"]
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
