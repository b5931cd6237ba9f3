use std::rc::Rc;

use csv::StringRecord;

/// One input record, addressable by source column name.
#[derive(Debug, Clone)]
pub struct InputRow {
    line: u64,
    columns: Rc<[String]>,
    record: StringRecord,
}

impl InputRow {
    pub fn new(line: u64, columns: Rc<[String]>, record: StringRecord) -> Self {
        Self {
            line,
            columns,
            record,
        }
    }

    /// 1-based line of the record in the input file.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Looks up a source column.
    ///
    /// Returns `None` when the column is unknown to the input, and `Some(None)`
    /// when the column exists but this record is too short to carry a value for it.
    /// A repeated column name resolves to its last occurrence.
    pub fn value(&self, column: &str) -> Option<Option<&str>> {
        let index = self.columns.iter().rposition(|name| name == column)?;
        Some(self.record.get(index))
    }

    pub fn is_blank(&self) -> bool {
        self.record.iter().all(str::is_empty)
    }
}
