use std::{convert::Infallible, path::Path, str::FromStr};

use serde::Deserialize;

/// Only `tsv` switches to tab separation; any other name reads as CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum InputFormat {
    Csv,
    Tsv,
}

impl InputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            InputFormat::Csv => "csv",
            InputFormat::Tsv => "tsv",
        }
    }

    pub fn delimiter(self) -> u8 {
        match self {
            InputFormat::Csv => b',',
            InputFormat::Tsv => b'\t',
        }
    }

    /// `.tsv` files are tab separated, everything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("tsv") => InputFormat::Tsv,
            _ => InputFormat::Csv,
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("tsv") {
            Ok(InputFormat::Tsv)
        } else {
            Ok(InputFormat::Csv)
        }
    }
}

impl From<String> for InputFormat {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(format) => format,
            Err(never) => match never {},
        }
    }
}
