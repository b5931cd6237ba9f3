pub mod delimited_reader;
pub mod mapping_loader;
pub mod output_dir;
pub mod part_file_writer;
