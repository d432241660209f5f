use super::types::*;
use crate::config::{expand_env_vars, expand_tilde};
use crate::source::timestamp::TimestampParser;
use crate::source::tokenizer::DelimiterConfig;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string)
}

/// Parse and validate config from a YAML string
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    // Expand environment variables in the YAML string before parsing
    let yaml_string = expand_env_vars(yaml);

    check_unexpanded_vars(&yaml_string)?;

    let mut config: Config = serde_yaml::from_str(&yaml_string)?;

    expand_paths(&mut config);

    validate_config(&config)?;

    Ok(config)
}

/// Checks for unexpanded environment variables and returns a helpful error
fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let re = Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    let mut unexpanded_vars: Vec<String> = re
        .captures_iter(yaml_string)
        .map(|cap| cap[1].to_string())
        .collect();

    if unexpanded_vars.is_empty() {
        return Ok(());
    }

    unexpanded_vars.sort();
    unexpanded_vars.dedup();

    Err(ConfigError::Validation(format!(
        "environment variables are not set: {}",
        unexpanded_vars.join(", ")
    )))
}

/// Expands tilde (~) in file source locations.
fn expand_paths(config: &mut Config) {
    for source in &mut config.sources {
        if let Location::File(path) = source.location() {
            source.location = expand_tilde(&path).to_string_lossy().into_owned();
        }
    }
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.sources.is_empty() {
        errors.push("config must define at least one source".to_string());
    }

    let mut names = HashSet::new();
    for (i, source) in config.sources.iter().enumerate() {
        if source.name.is_empty() {
            errors.push(format!("sources[{}]: name cannot be empty", i));
        } else if !names.insert(source.name.as_str()) {
            errors.push(format!("sources[{}]: duplicate source name '{}'", i, source.name));
        }
        validate_source(source, &mut errors);
    }

    if config.transport.poll_interval.is_zero() {
        errors.push("transport.poll_interval must be greater than zero".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

fn validate_source(source: &SourceConfig, errors: &mut Vec<String>) {
    let name = &source.name;

    if source.location.trim().is_empty() {
        errors.push(format!("source '{}': location cannot be empty", name));
    }

    if source.bucket_width_ms() <= 0 {
        errors.push(format!(
            "source '{}': bucket_width must be at least 1ms",
            name
        ));
    }

    let delimiters = &source.delimiters;
    if let Err(e) = DelimiterConfig::new(&delimiters.record, &delimiters.field, &delimiters.trim) {
        errors.push(format!("source '{}': {}", name, e));
    }

    if let Err(e) = TimestampParser::new(&source.timestamp.format) {
        errors.push(format!("source '{}': {}", name, e));
    }

    let mut field_names = HashSet::new();
    for field in &source.fields {
        if field.name.is_empty() {
            errors.push(format!(
                "source '{}': field at index {} has an empty name",
                name, field.index
            ));
        } else if !field_names.insert(field.name.as_str()) {
            errors.push(format!(
                "source '{}': duplicate field name '{}'",
                name, field.name
            ));
        }
    }
}
