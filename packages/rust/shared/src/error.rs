//! Error types for the help-book extractor.
//!
//! Library crates use [`HelpBookError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all help-book operations.
#[derive(Debug, thiserror::Error)]
pub enum HelpBookError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Container integrity violation (bad header, reserved marker, out-of-range read).
    #[error("container format error: {message}")]
    Format { message: String },

    /// Malformed table-of-contents token or grammar violation.
    #[error("TOC parse error at byte {offset}: {message}")]
    Toc { message: String, offset: usize },

    /// Decompression of a packed blob failed.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// A required resource (entity, archive entry, page path) is absent or blank.
    #[error("load error: {message}")]
    Load { message: String },

    /// A page contains a chapter that its page kind does not recognise.
    #[error("unknown page block '{title}'")]
    UnknownPageBlock { title: String },

    /// An anchor carries text but no target.
    #[error("malformed link '{text}': anchor has no href")]
    MalformedLink { text: String },

    /// Chapter routing or handler failure while extracting a page.
    #[error("extraction error: {message}")]
    Extraction { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HelpBookError>;

impl HelpBookError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a container format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format {
            message: msg.into(),
        }
    }

    /// Create a TOC parse error at the given byte offset.
    pub fn toc(msg: impl Into<String>, offset: usize) -> Self {
        Self::Toc {
            message: msg.into(),
            offset,
        }
    }

    /// Create a missing-resource error.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load {
            message: msg.into(),
        }
    }

    /// Create an extraction error.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error invalidates the whole container rather than one page.
    pub fn is_fatal_for_container(&self) -> bool {
        matches!(
            self,
            Self::Format { .. } | Self::Toc { .. } | Self::Decompression(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = HelpBookError::toc("expected '{'", 42);
        assert_eq!(err.to_string(), "TOC parse error at byte 42: expected '{'");

        let err = HelpBookError::UnknownPageBlock {
            title: "Events:".into(),
        };
        assert!(err.to_string().contains("Events:"));
    }

    #[test]
    fn container_fatality() {
        assert!(HelpBookError::format("bad reserved").is_fatal_for_container());
        assert!(!HelpBookError::load("no such entry").is_fatal_for_container());
        assert!(
            !HelpBookError::MalformedLink {
                text: "Array".into()
            }
            .is_fatal_for_container()
        );
    }
}
