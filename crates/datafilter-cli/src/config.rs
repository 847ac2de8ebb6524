//! Condition files and `--where` expressions.
//!
//! A conditions file is YAML, or JSON when its extension is `.json`:
//!
//! ```yaml
//! polarity: whitelist
//! conditions:
//!   - [data.author.age, ">", 25]
//!   - [type, "not equal", [newsletter, spam]]
//!   - [~, "starts with", "news"]
//! ```
//!
//! Each condition is a `[field, operator, value]` triple. A `null` or empty
//! field tests the record itself.

use std::fs;
use std::path::{Path, PathBuf};

use datafilter::{Condition, Filter, Polarity};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Separator between the parts of a `--where` expression.
pub const WHERE_SEPARATOR: char = '|';

/// Errors raised while loading conditions.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML conditions: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON conditions: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid condition '{0}': expected \"field|operator|value\"")]
    InvalidWhere(String),
}

/// A `[field, operator, value]` triple as written in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionSpec(pub Option<String>, pub String, pub Value);

impl ConditionSpec {
    /// Builds the library condition; a missing field becomes the empty path.
    pub fn to_condition(&self) -> Condition {
        let ConditionSpec(field, operator, value) = self;
        Condition::new(
            field.clone().unwrap_or_default(),
            operator.as_str(),
            value.clone(),
        )
    }
}

/// Contents of a conditions file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Polarity to apply unless overridden on the command line.
    #[serde(default)]
    pub polarity: Option<Polarity>,
    /// Conditions, in evaluation order.
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
}

impl FilterConfig {
    /// Loads a conditions file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            FilterConfig::from_json(&text)
        } else {
            FilterConfig::from_yaml(&text)
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        // An empty document has no mapping at all.
        if text.trim().is_empty() {
            return Ok(FilterConfig::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds a filter on the global registry from these conditions.
    pub fn to_filter(&self) -> Filter {
        self.conditions.iter().map(ConditionSpec::to_condition).collect()
    }
}

/// Parses a `--where` expression.
///
/// The value is read as JSON when it parses as JSON and as plain text
/// otherwise, so `type|==|article` and `age|>|25` both work. An empty field
/// tests the record itself.
///
/// ```
/// use datafilter_cli::config::{parse_where, ConditionSpec};
/// use serde_json::json;
///
/// let spec = parse_where("data.author.age|>|25").unwrap();
/// assert_eq!(spec, ConditionSpec(Some("data.author.age".into()), ">".into(), json!(25)));
/// ```
pub fn parse_where(expr: &str) -> Result<ConditionSpec, ConfigError> {
    let mut parts = expr.splitn(3, WHERE_SEPARATOR);
    let (Some(field), Some(operator), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ConfigError::InvalidWhere(expr.to_string()));
    };
    if operator.trim().is_empty() {
        return Err(ConfigError::InvalidWhere(expr.to_string()));
    }

    let field = field.trim();
    let field = (!field.is_empty()).then(|| field.to_string());
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok(ConditionSpec(field, operator.to_string(), value))
}
