pub mod json_loader;
pub mod source;

pub use json_loader::read_json_file;
pub use source::CatalogSource;
