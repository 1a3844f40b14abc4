use std::error::Error;
use std::io;
use thiserror::Error;

/// The error type a [`Response`](crate::Response) may carry, and the error
/// type transport-level handlers report.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Failure raised while a deferred body is being drained into its sink.
///
/// Composition never produces this error: every fallible step (opening a file,
/// serializing a value, executing a template) is postponed until render time.
#[derive(Error, Debug)]
pub enum DrainError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("json encode error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("xml encode error: {source}")]
    Xml {
        #[from]
        source: quick_xml::SeError,
    },

    #[error("form encode error: {source}")]
    Form {
        #[from]
        source: serde_urlencoded::ser::Error,
    },

    #[error("template error: {source}")]
    Template {
        #[from]
        source: minijinja::Error,
    },
}

impl DrainError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns the [`io::ErrorKind`] when the drain failed on I/O.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Failure raised by [`render`](crate::render).
///
/// By the time any of these is returned the status line and headers are
/// already committed to the writer.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("drain body error: {source}")]
    Drain {
        #[from]
        source: DrainError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl RenderError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_io_kind() {
        let err = DrainError::io(io::Error::from(ErrorKind::NotFound));
        assert_eq!(err.io_kind(), Some(ErrorKind::NotFound));

        let err = DrainError::from(quick_xml::SeError::Custom("unsupported value".to_string()));
        assert_eq!(err.io_kind(), None);
        assert_eq!(err.to_string(), "xml encode error: unsupported value");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_render_error_from_drain() {
        let err: RenderError = DrainError::io(io::Error::from(ErrorKind::BrokenPipe)).into();
        assert!(matches!(err, RenderError::Drain { .. }));
    }
}
