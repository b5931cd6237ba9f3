/// Date/time function tokens that are emitted as SQL calls instead of text.
const DATETIME_FUNCTIONS: [&str; 4] = ["CURRENT_TIMESTAMP", "NOW()", "GETDATE()", "SYSDATE"];

/// Formats one raw field as a SQL literal token.
///
/// Blank input becomes `NULL`, numeric columns keep parseable numerals unquoted,
/// boolean/`NULL`/date-function keywords pass through uppercased, and anything
/// else is single-quoted with embedded quotes doubled.
pub fn escape_sql_value(raw_value: Option<&str>, is_numeric: bool) -> String {
    let Some(raw_value) = raw_value else {
        return "NULL".to_string();
    };

    let trimmed = raw_value.trim();
    if trimmed.is_empty() {
        return "NULL".to_string();
    }

    if is_numeric && is_finite_number(trimmed) {
        return trimmed.to_string();
    }

    let uppercased = trimmed.to_uppercase();
    if uppercased == "TRUE" || uppercased == "FALSE" || uppercased == "NULL" {
        return uppercased;
    }

    if DATETIME_FUNCTIONS.contains(&uppercased.as_str()) {
        return uppercased;
    }

    format!("'{}'", trimmed.replace('\'', "''"))
}

// `inf` and `NaN` parse as f64 but are not SQL numerals.
fn is_finite_number(value: &str) -> bool {
    value
        .parse::<f64>()
        .map(|number| number.is_finite())
        .unwrap_or(false)
}
