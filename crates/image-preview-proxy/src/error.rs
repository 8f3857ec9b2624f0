//! Error types for the image preview proxy

use std::fmt;

#[derive(Debug)]
pub enum PreviewError {
    /// Transport failure reaching the image source.
    RemoteUnavailable(Box<reqwest::Error>),
    /// The source answered with a non-success status.
    RemoteRejected(u16),
    /// The source returned something other than a JPEG image.
    UnsupportedContentType(String),
    /// Local persistence failed; nothing was published to the cache.
    Storage(Box<std::io::Error>),
    /// The fetched bytes could not be decoded or re-encoded.
    InvalidImage(String),
    /// Requested preview dimensions below the minimum.
    SizeTooSmall { width: u32, height: u32 },
    Config(String),
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewError::RemoteUnavailable(err) => write!(f, "remote unavailable: {}", err),
            PreviewError::RemoteRejected(status) => {
                write!(f, "remote rejected the request with status {}", status)
            }
            PreviewError::UnsupportedContentType(content_type) => {
                write!(f, "unsupported content type: {}", content_type)
            }
            PreviewError::Storage(err) => write!(f, "storage error: {}", err),
            PreviewError::InvalidImage(msg) => write!(f, "invalid image: {}", msg),
            PreviewError::SizeTooSmall { width, height } => write!(
                f,
                "width and height must be at least 128, got {}x{}",
                width, height
            ),
            PreviewError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PreviewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PreviewError::RemoteUnavailable(err) => Some(err.as_ref()),
            PreviewError::Storage(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PreviewError {
    fn from(err: reqwest::Error) -> Self {
        PreviewError::RemoteUnavailable(Box::new(err))
    }
}

impl From<std::io::Error> for PreviewError {
    fn from(err: std::io::Error) -> Self {
        PreviewError::Storage(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for PreviewError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        PreviewError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PreviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_rejected_display() {
        let err = PreviewError::RemoteRejected(404);
        assert_eq!(
            format!("{}", err),
            "remote rejected the request with status 404"
        );
    }

    #[test]
    fn test_unsupported_content_type_display() {
        let err = PreviewError::UnsupportedContentType("image/png".to_string());
        assert_eq!(format!("{}", err), "unsupported content type: image/png");
    }

    #[test]
    fn test_size_too_small_display() {
        let err = PreviewError::SizeTooSmall {
            width: 64,
            height: 200,
        };
        assert!(format!("{}", err).contains("64x200"));
    }

    #[test]
    fn test_storage_error_from_io() {
        let err: PreviewError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, PreviewError::Storage(_)));
        assert!(format!("{}", err).contains("denied"));
    }

    #[test]
    fn test_error_is_debug() {
        let err = PreviewError::Config("missing CACHE_DIR".to_string());
        assert!(format!("{:?}", err).contains("Config"));
    }
}
