pub mod generate_update_sql;
