use std::io;

/// All error types for the scene loading pipeline.
///
/// Only document-level failures abort a load. Tessellation and decode errors
/// are reported by the collaborators and recovered per shape / per texture.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("Input error: {0}")]
    Input(String),
    #[error("Document error: {0}")]
    Document(String),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Tessellation error: {0}")]
    Tessellation(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_strings() {
        let e = SceneError::Input("bad file".into());
        assert_eq!(e.to_string(), "Input error: bad file");

        let e = SceneError::Document("no <scene> root".into());
        assert_eq!(e.to_string(), "Document error: no <scene> root");

        let e = SceneError::Tessellation("index out of range".into());
        assert_eq!(e.to_string(), "Tessellation error: index out of range");

        let e = SceneError::Decode("truncated png".into());
        assert_eq!(e.to_string(), "Decode error: truncated png");
    }

    #[test]
    fn from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let e: SceneError = io_err.into();
        assert!(matches!(e, SceneError::Io(_)));
        assert!(e.to_string().contains("file missing"));
    }
}
