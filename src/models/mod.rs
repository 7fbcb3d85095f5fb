// src/models/mod.rs

use url::Url;
use validator::ValidationError;

pub mod article;
pub mod profile;
pub mod user;

/// Accepts an empty string (clears the image) or an absolute URL.
fn validate_image_url(image: &str) -> Result<(), ValidationError> {
    if image.is_empty() || Url::parse(image).is_ok() {
        return Ok(());
    }
    let mut error = ValidationError::new("invalid_url");
    error.message = Some("image must be a URL".into());
    Err(error)
}
