pub mod code_generator;
pub mod url_validator;

pub use code_generator::{ALPHABET, CodeGenerator};
pub use url_validator::validate_long_url;
