use std::{fs, path::Path};

use tracing::debug;

use crate::{domain::mapping::MappingConfig, error::ConfigError};

/// Loads and validates a mapping document. `.json` files are parsed as JSON,
/// anything else as YAML.
pub fn load_mapping(path: &Path) -> Result<MappingConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    let mapping = if is_json {
        mapping_from_json(&content)?
    } else {
        mapping_from_yaml(&content)?
    };
    debug!(config = %path.display(), "loaded mapping configuration");
    Ok(mapping)
}

pub fn mapping_from_yaml(content: &str) -> Result<MappingConfig, ConfigError> {
    let mapping: MappingConfig = serde_yaml::from_str(content)?;
    mapping.validate()?;
    Ok(mapping)
}

pub fn mapping_from_json(content: &str) -> Result<MappingConfig, ConfigError> {
    let mapping: MappingConfig = serde_json::from_str(content)?;
    mapping.validate()?;
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::{load_mapping, mapping_from_json, mapping_from_yaml};
    use crate::{
        domain::{input_format::InputFormat, mapping::StaticValue},
        error::ConfigError,
    };

    const PRODUCT_YAML: &str = r#"
database:
  name: mms
  table: PRODUCT_IMAGES
input:
  file: data/products.tsv
  format: TSV
  has_header: true
identifiers:
  - name: PRODUCT_ID
    column: sku
    is_numeric: false
update_columns:
  - name: QUANTITY
    column: qty
    data_type: number
  - name: WEIGHT
    column: weight
    is_numeric: "yes"
static_values:
  UPDATED_BY: importer
  UPDATED_AT: NOW()
  ACTIVE: true
  NOTE: ~
batch:
  size: 500
"#;

    #[test]
    fn parses_full_yaml_document() {
        let mapping = mapping_from_yaml(PRODUCT_YAML).expect("mapping should parse");

        assert_eq!(mapping.database.qualified_table(), "mms.PRODUCT_IMAGES");
        assert_eq!(mapping.input.file, Some(PathBuf::from("data/products.tsv")));
        assert_eq!(mapping.input.format, Some(InputFormat::Tsv));
        assert!(!mapping.identifiers[0].treats_as_numeric());
        assert!(mapping.update_columns[0].treats_as_numeric());
        assert!(mapping.update_columns[1].treats_as_numeric());
        assert_eq!(mapping.batch.size, 500);
        assert_eq!(mapping.output.dir, PathBuf::from("output"));

        let static_keys = mapping.static_values.keys().cloned().collect::<Vec<_>>();
        assert_eq!(static_keys, ["UPDATED_BY", "UPDATED_AT", "ACTIVE", "NOTE"]);
        assert_eq!(
            mapping.static_values["ACTIVE"],
            Some(StaticValue::Boolean(true))
        );
        assert_eq!(mapping.static_values["NOTE"], None);
    }

    #[test]
    fn applies_defaults_for_optional_sections() {
        let yaml = r#"
database: { name: mms, table: PRODUCTS }
input: {}
identifiers:
  - { name: ID, column: id, data_type: number }
update_columns:
  - { name: PRICE, column: price }
"#;
        let mapping = mapping_from_yaml(yaml).expect("mapping should parse");

        assert_eq!(mapping.batch.size, 10_000);
        assert!(mapping.input.has_header);
        assert!(mapping.input.format.is_none());
        assert!(mapping.static_values.is_empty());
    }

    #[test]
    fn unrecognised_format_reads_as_csv() {
        let yaml = r#"
database: { name: mms, table: PRODUCTS }
input: { format: txt }
identifiers:
  - { name: ID, column: id }
update_columns:
  - { name: PRICE, column: price }
"#;
        let mapping = mapping_from_yaml(yaml).expect("mapping should parse");

        assert_eq!(mapping.input.format, Some(InputFormat::Csv));
    }

    #[test]
    fn missing_required_section_is_a_config_error() {
        let yaml = r#"
database: { name: mms, table: PRODUCTS }
input: {}
update_columns:
  - { name: PRICE, column: price }
"#;
        let error = mapping_from_yaml(yaml).expect_err("identifiers are required");

        assert!(matches!(error, ConfigError::Yaml(_)));
        assert!(error.to_string().contains("identifiers"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let yaml = r#"
database: { name: mms, table: PRODUCTS, schema: dbo }
input: {}
identifiers:
  - { name: ID, column: id }
update_columns:
  - { name: PRICE, column: price }
"#;
        assert!(mapping_from_yaml(yaml).is_err());
    }

    #[test]
    fn validation_runs_after_parsing() {
        let yaml = r#"
database: { name: mms, table: PRODUCTS }
input: {}
identifiers: []
update_columns:
  - { name: PRICE, column: price }
"#;
        let error = mapping_from_yaml(yaml).expect_err("empty identifiers are rejected");

        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn parses_json_documents() {
        let json = r#"{
            "database": {"name": "mms", "table": "PRODUCTS"},
            "input": {"format": "csv", "has_header": false},
            "identifiers": [{"name": "ID", "column": "id", "is_numeric": "true"}],
            "update_columns": [],
            "static_values": {"SYNCED_AT": "CURRENT_TIMESTAMP"}
        }"#;
        let mapping = mapping_from_json(json).expect("mapping should parse");

        assert!(mapping.identifiers[0].treats_as_numeric());
        assert!(!mapping.input.has_header);
    }

    #[test]
    fn loads_from_disk_by_extension() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("update.yaml");
        fs::write(&path, PRODUCT_YAML).expect("config should be written");

        let mapping = load_mapping(&path).expect("mapping should load");
        assert_eq!(mapping.database.name, "mms");

        let error = load_mapping(&dir.path().join("missing.yaml"))
            .expect_err("missing file should fail");
        assert!(matches!(error, ConfigError::Read { .. }));
    }
}
