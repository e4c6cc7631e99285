pub mod extractor;
pub mod test_utils;
pub mod validation;

pub use extractor::JsonBody;
pub use validation::{parse_timestamp, require, require_text, ValidationError};
