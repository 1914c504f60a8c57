use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// The format a field value is expected to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// A calendar date, `YYYYMMDD`.
    Date,
    /// A date and time, `YYYYMMDDHHMM` or `YYYYMMDDHHMMSS`.
    DateTime,
    /// A decimal number, optionally signed.
    Numeric,
}

/// A check applied to the value at one path.
///
/// Checks run in order: presence, length, membership, then format. A missing
/// required value fails once and skips the remaining checks of this rule. An
/// empty value that is not required passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// The path to check, e.g. `PID-5.1`.
    pub path: String,

    /// Whether the value must be present. Whitespace counts as absent.
    #[serde(default)]
    pub required: bool,

    /// The maximum length of the value, in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// The values the field may take. Matching is exact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,

    /// The format the value must take.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
}

impl Rule {
    /// Creates a rule for `path` that checks nothing yet.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required: false,
            max_length: None,
            allowed_values: None,
            data_type: None,
        }
    }

    /// Requires the value to be present.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Limits the value to `max` characters.
    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Restricts the value to one of `values`.
    #[must_use]
    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Requires the value to be of the given format.
    #[must_use]
    pub const fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }
}

/// An ordered collection of validation rules.
///
/// Rule sets are stored as TOML (or YAML, chosen by file extension):
///
/// ```toml
/// _version = "1"
///
/// [[rules]]
/// path = "PID-3"
/// required = true
/// max_length = 20
///
/// [[rules]]
/// path = "PID-8"
/// allowed_values = ["M", "F", "O", "U"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates a rule set from `rules`, kept in the given order.
    #[must_use]
    pub const fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The rules, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Loads a rule set from a file.
    ///
    /// Files ending in `.yaml` or `.yml` are read as YAML, anything else as
    /// TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents cannot be
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let rules: Self = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        tracing::debug!("Loaded {} rules from {}", rules.rules.len(), path.display());
        Ok(rules)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(OsStr::to_str),
        Some("yaml" | "yml")
    )
}

/// Errors that can occur when loading a rule set.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("Failed to read rules file {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The file is not a valid TOML rule set.
    #[error("Failed to parse rules file: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file is not a valid YAML rule set.
    #[error("Failed to parse rules file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// The serialized versions of a rule set.
///
/// This allows the file format to change without breaking existing rule
/// files.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        rules: Vec<Rule>,
    },
}

impl From<Versions> for RuleSet {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { rules } => Self { rules },
        }
    }
}

impl From<RuleSet> for Versions {
    fn from(rule_set: RuleSet) -> Self {
        Self::V1 {
            rules: rule_set.rules,
        }
    }
}
