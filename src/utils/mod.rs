pub mod file;
pub mod validation;

pub use file::*;
pub use validation::{parse_output_format, validate_source_url};
