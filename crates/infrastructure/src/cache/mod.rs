mod file_store;
mod filename;

pub use file_store::FileCatalogueStore;
pub use filename::{cache_file_name, ensure_distinct_cache_files, sanitize_filename};
