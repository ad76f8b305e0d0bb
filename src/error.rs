// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the visualization library.

use std::fmt;

/// Result type alias for visualization operations.
pub type Result<T> = std::result::Result<T, VizError>;

/// Main error type for the visualization library.
#[derive(Debug)]
pub enum VizError {
    /// Error decoding or encoding images.
    ImageError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Input array has the wrong shape.
    ShapeError(String),
    /// An index (skeleton edge, highlight, score) points outside its array.
    IndexError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Error while rasterizing a figure.
    RenderError(String),
    /// Visualizer error.
    VisualizerError(String),
    /// Malformed keypoint annotation file.
    AnnotationError(String),
    /// Feature not enabled.
    FeatureNotEnabled(String),
}

impl fmt::Display for VizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::ShapeError(msg) => write!(f, "Shape error: {msg}"),
            Self::IndexError(msg) => write!(f, "Index error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::RenderError(msg) => write!(f, "Render error: {msg}"),
            Self::VisualizerError(msg) => write!(f, "Visualizer error: {msg}"),
            Self::AnnotationError(msg) => write!(f, "Annotation error: {msg}"),
            Self::FeatureNotEnabled(msg) => write!(f, "Feature not enabled: {msg}"),
        }
    }
}

impl std::error::Error for VizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VizError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for VizError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => Self::Io(io),
            other => Self::ImageError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for VizError {
    fn from(err: serde_json::Error) -> Self {
        Self::AnnotationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VizError::ShapeError("test".to_string());
        assert_eq!(err.to_string(), "Shape error: test");

        let err = VizError::IndexError("test".to_string());
        assert_eq!(err.to_string(), "Index error: test");
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error;

        let err = VizError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_image_io_error_maps_to_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        let err = VizError::from(image::ImageError::IoError(io));
        assert!(matches!(err, VizError::Io(_)));
    }
}
