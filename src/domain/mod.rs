pub mod input_format;
pub mod input_row;
pub mod mapping;
pub mod part_file;
pub mod row_compiler;
pub mod sql_literal;
