use crate::error::ConfigError;

/// Statements written per output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(usize);

impl BatchSize {
    pub fn new(value: usize) -> Result<Self, ConfigError> {
        if value == 0 {
            return Err(ConfigError::Invalid(
                "batch.size must be greater than 0".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// A new part begins before the first statement and after every full batch.
    pub fn starts_new_part(self, written_statements: usize) -> bool {
        written_statements % self.0 == 0
    }
}

/// `<stem>_part_<NNN>.sql`, numbered from 1 and zero-padded to three digits.
pub fn part_file_name(input_stem: &str, part_number: usize) -> String {
    format!("{input_stem}_part_{part_number:03}.sql")
}

#[cfg(test)]
mod tests {
    use super::{BatchSize, part_file_name};

    #[test]
    fn rejects_zero_batch_size() {
        let error = BatchSize::new(0).expect_err("zero batch size should be rejected");
        assert!(error.to_string().contains("batch.size must be greater than 0"));
    }

    #[test]
    fn rotates_on_batch_boundaries() {
        let batch_size = BatchSize::new(2).expect("batch size should be valid");
        let boundaries = (0..6)
            .filter(|written| batch_size.starts_new_part(*written))
            .collect::<Vec<_>>();

        assert_eq!(boundaries, vec![0, 2, 4]);
    }

    #[test]
    fn part_names_are_zero_padded() {
        assert_eq!(part_file_name("products", 1), "products_part_001.sql");
        assert_eq!(part_file_name("products", 42), "products_part_042.sql");
        assert_eq!(part_file_name("products", 1234), "products_part_1234.sql");
    }
}
