use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from reading, writing or enumerating files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed image or document data.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => AppError::Io(e),
            other => AppError::Decode(other.to_string()),
        }
    }
}
