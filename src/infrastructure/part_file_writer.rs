use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    domain::part_file::{BatchSize, part_file_name},
    error::RunError,
};

const STATEMENTS_PER_SPACER: usize = 100;

#[derive(Debug)]
struct OpenPart {
    path: PathBuf,
    writer: BufWriter<File>,
    statements: usize,
}

impl OpenPart {
    fn close(mut self) -> Result<(), RunError> {
        self.writer
            .flush()
            .map_err(|source| RunError::write_part(&self.path, source))?;
        debug!(path = %self.path.display(), statements = self.statements, "closed part file");
        Ok(())
    }
}

/// Appends statements to `<stem>_part_<NNN>.sql` files, starting a new file
/// whenever the current one holds a full batch.
#[derive(Debug)]
pub struct PartFileWriter {
    output_dir: PathBuf,
    input_stem: String,
    database_name: String,
    batch_size: BatchSize,
    current: Option<OpenPart>,
    written_statements: usize,
    part_files: Vec<String>,
}

impl PartFileWriter {
    pub fn create(
        output_dir: &Path,
        input_stem: &str,
        database_name: &str,
        batch_size: BatchSize,
    ) -> Result<Self, RunError> {
        fs::create_dir_all(output_dir).map_err(|source| RunError::CreateOutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            input_stem: input_stem.to_string(),
            database_name: database_name.to_string(),
            batch_size,
            current: None,
            written_statements: 0,
            part_files: Vec::new(),
        })
    }

    pub fn write_statement(&mut self, statement: &str) -> Result<(), RunError> {
        if self.batch_size.starts_new_part(self.written_statements) {
            self.close_current()?;
        }

        let mut part = match self.current.take() {
            Some(part) => part,
            None => self.open_next_part()?,
        };

        writeln!(part.writer, "{statement}")
            .map_err(|source| RunError::write_part(&part.path, source))?;
        part.statements += 1;
        self.written_statements += 1;

        if part.statements % STATEMENTS_PER_SPACER == 0 {
            writeln!(part.writer).map_err(|source| RunError::write_part(&part.path, source))?;
        }

        self.current = Some(part);
        Ok(())
    }

    /// Flushes and closes the open part file, if any.
    pub fn finish(&mut self) -> Result<(), RunError> {
        self.close_current()
    }

    pub fn part_files(&self) -> &[String] {
        &self.part_files
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn written_statements(&self) -> usize {
        self.written_statements
    }

    fn close_current(&mut self) -> Result<(), RunError> {
        match self.current.take() {
            Some(part) => part.close(),
            None => Ok(()),
        }
    }

    fn open_next_part(&mut self) -> Result<OpenPart, RunError> {
        let file_name = part_file_name(&self.input_stem, self.part_files.len() + 1);
        let path = self.output_dir.join(&file_name);

        let file = File::create(&path).map_err(|source| RunError::CreatePart {
            path: path.clone(),
            source,
        })?;
        self.part_files.push(file_name);

        let mut writer = BufWriter::new(file);
        write!(writer, "USE {};\n\n", self.database_name)
            .map_err(|source| RunError::write_part(&path, source))?;
        debug!(path = %path.display(), "opened part file");

        Ok(OpenPart {
            path,
            writer,
            statements: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::PartFileWriter;
    use crate::domain::part_file::BatchSize;

    fn statement(index: usize) -> String {
        format!("UPDATE db.t SET a = {index} WHERE id = {index};")
    }

    #[test]
    fn rotates_files_at_batch_boundaries() {
        let output_dir = tempfile::tempdir().expect("temp dir should be created");
        let batch_size = BatchSize::new(2).expect("batch size should be valid");
        let mut writer = PartFileWriter::create(output_dir.path(), "products", "mms", batch_size)
            .expect("writer should be created");

        for index in 1..=5 {
            writer
                .write_statement(&statement(index))
                .expect("statement should be written");
        }
        writer.finish().expect("writer should be closed");

        assert_eq!(
            writer.part_files(),
            [
                "products_part_001.sql",
                "products_part_002.sql",
                "products_part_003.sql"
            ]
        );
        let last = fs::read_to_string(output_dir.path().join("products_part_003.sql"))
            .expect("last part should be readable");
        assert_eq!(last, format!("USE mms;\n\n{}\n", statement(5)));
    }

    #[test]
    fn no_file_is_created_without_statements() {
        let output_dir = tempfile::tempdir().expect("temp dir should be created");
        let batch_size = BatchSize::new(10).expect("batch size should be valid");
        let mut writer = PartFileWriter::create(output_dir.path(), "products", "mms", batch_size)
            .expect("writer should be created");

        writer.finish().expect("writer should be closed");

        assert!(writer.part_files().is_empty());
        let entries = fs::read_dir(output_dir.path())
            .expect("output dir should be listed")
            .count();
        assert_eq!(entries, 0);
    }

    #[test]
    fn inserts_spacer_after_every_hundred_statements() {
        let output_dir = tempfile::tempdir().expect("temp dir should be created");
        let batch_size = BatchSize::new(250).expect("batch size should be valid");
        let mut writer = PartFileWriter::create(output_dir.path(), "bulk", "mms", batch_size)
            .expect("writer should be created");

        for index in 1..=201 {
            writer
                .write_statement(&statement(index))
                .expect("statement should be written");
        }
        writer.finish().expect("writer should be closed");

        let content = fs::read_to_string(output_dir.path().join("bulk_part_001.sql"))
            .expect("part should be readable");
        let lines = content.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "USE mms;");
        assert_eq!(lines[1], "");
        assert_eq!(lines[101], statement(100));
        assert_eq!(lines[102], "");
        assert_eq!(lines[202], statement(200));
        assert_eq!(lines[203], "");
        assert_eq!(lines[204], statement(201));
        assert_eq!(writer.written_statements(), 201);
    }

    #[test]
    fn creates_missing_output_directory() {
        let root = tempfile::tempdir().expect("temp dir should be created");
        let nested = root.path().join("nested").join("out");
        let batch_size = BatchSize::new(1).expect("batch size should be valid");

        let writer = PartFileWriter::create(&nested, "products", "mms", batch_size)
            .expect("writer should be created");

        assert!(nested.is_dir());
        assert_eq!(writer.output_dir(), nested.as_path());
    }
}
