pub mod filename_selector;
pub mod image_validator;
pub mod payload_decoder;
pub mod token_extractor;
pub mod wrapper_url_parser;

pub use filename_selector::{is_image_filename, is_map_thumbnail, select_attachment};
pub use image_validator::{image_extension, validate_image, validate_image_blocking};
pub use payload_decoder::{decode_payload, strip_data_uri};
pub use token_extractor::TokenExtractor;
pub use wrapper_url_parser::WrapperUrlParser;
