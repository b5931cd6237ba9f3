use std::{fs::File, io, path::Path, rc::Rc};

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::domain::{input_format::InputFormat, input_row::InputRow};

/// Streams CSV/TSV records as [`InputRow`]s, one record at a time.
#[derive(Debug)]
pub struct DelimitedRowReader<R> {
    reader: Reader<R>,
    columns: Rc<[String]>,
}

impl DelimitedRowReader<File> {
    pub fn open(
        path: &Path,
        format: InputFormat,
        has_header: bool,
        positional_columns: Vec<String>,
    ) -> csv::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, format, has_header, positional_columns)
    }
}

impl<R: io::Read> DelimitedRowReader<R> {
    pub fn from_reader(
        source: R,
        format: InputFormat,
        has_header: bool,
        positional_columns: Vec<String>,
    ) -> csv::Result<Self> {
        let reader = reader_builder(format, has_header).from_reader(source);
        Self::with_columns(reader, has_header, positional_columns)
    }

    fn with_columns(
        mut reader: Reader<R>,
        has_header: bool,
        positional_columns: Vec<String>,
    ) -> csv::Result<Self> {
        // Without a header row, record fields are named by position.
        let columns = if has_header {
            reader
                .headers()?
                .iter()
                .map(str::to_string)
                .collect::<Rc<[String]>>()
        } else {
            Rc::from(positional_columns)
        };

        Ok(Self { reader, columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl<R: io::Read> Iterator for DelimitedRowReader<R> {
    type Item = csv::Result<InputRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => {
                let line = record
                    .position()
                    .map(|position| position.line())
                    .unwrap_or_default();
                Some(Ok(InputRow::new(line, Rc::clone(&self.columns), record)))
            }
            Ok(false) => None,
            Err(error) => Some(Err(error)),
        }
    }
}

fn reader_builder(format: InputFormat, has_header: bool) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(format.delimiter())
        .has_headers(has_header)
        .flexible(true);
    builder
}
