/// Errors from image handling.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("invalid image id {id:?}: only letters, digits and '-' are allowed")]
    InvalidId { id: String },

    #[error("invalid extension {extension:?} for image {id:?}: only letters and digits are allowed")]
    InvalidExtension { id: String, extension: String },

    #[error("image {id:?} is referenced but no file was uploaded for it")]
    MissingPayload { id: String },

    #[error("reference pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

pub type ImageResult<T> = Result<T, ImageError>;
