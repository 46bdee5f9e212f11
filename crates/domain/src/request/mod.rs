//! Request documents and their building blocks.

mod body;
mod document;
mod method;
pub mod pairs;

pub use body::BodyType;
pub use document::{
    REQUEST_FILE_EXTENSION, RequestDocument, ensure_request_extension, is_request_file,
    request_base_name, request_file_name,
};
pub use method::HttpMethod;
pub use pairs::KeyValue;
