use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::{
    domain::{input_format::InputFormat, part_file::BatchSize},
    error::ConfigError,
};

pub const DEFAULT_BATCH_SIZE: usize = 10_000;
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Declarative description of how input columns become one `UPDATE` per row.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfig {
    pub database: DatabaseTarget,
    pub input: InputSettings,
    pub identifiers: Vec<ColumnMapping>,
    pub update_columns: Vec<ColumnMapping>,
    #[serde(default)]
    pub static_values: IndexMap<String, Option<StaticValue>>,
    #[serde(default)]
    pub batch: BatchSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseTarget {
    pub name: String,
    pub table: String,
}

impl DatabaseTarget {
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.name, self.table)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSettings {
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub format: Option<InputFormat>,
    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

impl InputSettings {
    /// The configured format, or the one implied by the input file extension.
    pub fn resolve_format(&self, input_path: &Path) -> InputFormat {
        self.format.unwrap_or_else(|| InputFormat::from_path(input_path))
    }
}

/// Pairs a source column of the input with a destination column of the table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMapping {
    pub name: String,
    pub column: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_numeric: bool,
}

impl ColumnMapping {
    pub fn treats_as_numeric(&self) -> bool {
        let declared_number = self
            .data_type
            .as_deref()
            .is_some_and(|data_type| data_type.trim().eq_ignore_ascii_case("number"));
        declared_number || self.is_numeric
    }
}

/// A configured SET value that does not come from the input row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StaticValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl StaticValue {
    /// Blank text sets nothing, same as a null entry.
    pub fn is_blank(&self) -> bool {
        matches!(self, StaticValue::Text(text) if text.trim().is_empty())
    }
}

impl Display for StaticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticValue::Boolean(value) => write!(f, "{value}"),
            StaticValue::Integer(value) => write!(f, "{value}"),
            // Whole floats keep their fractional digit: 1.0 stays "1.0".
            StaticValue::Float(value) if value.fract() == 0.0 && value.abs() < 1e16 => {
                write!(f, "{value:.1}")
            }
            StaticValue::Float(value) => write!(f, "{value}"),
            StaticValue::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchSettings {
    #[serde(default = "default_batch_size")]
    pub size: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl MappingConfig {
    pub fn batch_size(&self) -> Result<BatchSize, ConfigError> {
        BatchSize::new(self.batch.size)
    }

    /// Source column names used when the input has no header row.
    pub fn positional_columns(&self) -> Vec<String> {
        self.update_columns
            .iter()
            .map(|mapping| mapping.column.clone())
            .collect()
    }

    /// Static entries that end up in the SET clause.
    pub fn assigned_static_values(&self) -> impl Iterator<Item = (&String, &StaticValue)> {
        self.static_values
            .iter()
            .filter_map(|(column, value)| value.as_ref().map(|value| (column, value)))
            .filter(|(_, value)| !value.is_blank())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.name.trim().is_empty() {
            return Err(invalid("database.name is required"));
        }
        if self.database.table.trim().is_empty() {
            return Err(invalid("database.table is required"));
        }

        if self.identifiers.is_empty() {
            return Err(invalid("At least one identifier is required"));
        }
        if self.update_columns.is_empty() && self.assigned_static_values().next().is_none() {
            return Err(invalid("At least one update column or static value is required"));
        }

        validate_mappings("identifiers", &self.identifiers)?;
        validate_mappings("update_columns", &self.update_columns)?;

        if self.static_values.keys().any(|key| key.trim().is_empty()) {
            return Err(invalid("static_values keys must not be empty"));
        }

        self.batch_size()?;
        Ok(())
    }
}

fn validate_mappings(section: &str, mappings: &[ColumnMapping]) -> Result<(), ConfigError> {
    for (index, mapping) in mappings.iter().enumerate() {
        if mapping.name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{section}[{index}].name is required")));
        }
        if mapping.column.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{section}[{index}].column is required")));
        }
    }
    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

fn default_has_header() -> bool {
    true
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

/// Accepts YAML booleans as well as "true"/"1"/"yes" written as strings or numbers.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Boolean(bool),
        Integer(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Boolean(value)) => value,
        Some(Flag::Integer(value)) => value == 1,
        Some(Flag::Text(value)) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        ),
    })
}
