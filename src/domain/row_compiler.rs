use std::fmt::{self, Display};

use crate::domain::{
    input_row::InputRow,
    mapping::{ColumnMapping, MappingConfig, StaticValue},
    sql_literal::escape_sql_value,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingIdentifierColumn(String),
    NoIdentifierPredicates,
    NothingToUpdate,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingIdentifierColumn(column) => {
                write!(f, "Missing identifier column '{column}' in input data")
            }
            SkipReason::NoIdentifierPredicates => {
                f.write_str("No valid identifiers found for WHERE clause")
            }
            SkipReason::NothingToUpdate => f.write_str("No valid columns to update"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Statement(String),
    Skipped(SkipReason),
}

/// Compiles input rows into `UPDATE` statements for one mapping.
///
/// The target table and the static SET assignments do not depend on the row,
/// so they are rendered once up front.
#[derive(Debug)]
pub struct UpdateCompiler<'a> {
    mapping: &'a MappingConfig,
    target_table: String,
    static_assignments: Vec<String>,
}

impl<'a> UpdateCompiler<'a> {
    pub fn new(mapping: &'a MappingConfig) -> Self {
        let static_assignments = mapping
            .assigned_static_values()
            .map(|(column, value)| format!("{column} = {}", static_literal(value)))
            .collect();

        Self {
            mapping,
            target_table: mapping.database.qualified_table(),
            static_assignments,
        }
    }

    pub fn compile(&self, row: &InputRow) -> RowOutcome {
        let mut where_parts = Vec::with_capacity(self.mapping.identifiers.len());
        for identifier in &self.mapping.identifiers {
            let Some(value) = row.value(&identifier.column) else {
                return RowOutcome::Skipped(SkipReason::MissingIdentifierColumn(
                    identifier.column.clone(),
                ));
            };
            where_parts.push(assignment(identifier, value));
        }
        if where_parts.is_empty() {
            return RowOutcome::Skipped(SkipReason::NoIdentifierPredicates);
        }

        // Update columns absent from the input are left out of the SET clause.
        let mut set_parts = self
            .mapping
            .update_columns
            .iter()
            .filter_map(|column| row.value(&column.column).map(|value| assignment(column, value)))
            .collect::<Vec<_>>();
        set_parts.extend(self.static_assignments.iter().cloned());

        if set_parts.is_empty() {
            return RowOutcome::Skipped(SkipReason::NothingToUpdate);
        }

        RowOutcome::Statement(format!(
            "UPDATE {} SET {} WHERE {};",
            self.target_table,
            set_parts.join(", "),
            where_parts.join(" AND ")
        ))
    }
}

fn assignment(mapping: &ColumnMapping, value: Option<&str>) -> String {
    format!(
        "{} = {}",
        mapping.name,
        escape_sql_value(value, mapping.treats_as_numeric())
    )
}

/// Text ending in `()` is a verbatim call.
fn static_literal(value: &StaticValue) -> String {
    match value {
        StaticValue::Text(text) if text.ends_with("()") => text.clone(),
        _ => escape_sql_value(Some(&value.to_string()), false),
    }
}
