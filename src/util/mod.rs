//! Helpers shared by the feed parser and the terminal UI.
//!
//! - **URL validation**: only public http(s) links are stored or opened
//! - **Text**: control-character stripping and width-aware truncation

mod text;
mod url_validator;

pub use text::{strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url, UrlValidationError};
