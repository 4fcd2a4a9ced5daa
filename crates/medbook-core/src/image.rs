//! Lazy image source.

/// 1x1 transparent GIF shown until the real image has loaded.
pub const PLACEHOLDER_IMAGE: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAP///wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

/// Image whose displayed source switches from a placeholder to the real
/// URL once loading finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyImage {
    src: String,
    placeholder: String,
    loaded: bool,
}

impl LazyImage {
    pub fn new(src: impl Into<String>) -> Self {
        Self::with_placeholder(src, PLACEHOLDER_IMAGE)
    }

    pub fn with_placeholder(src: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            placeholder: placeholder.into(),
            loaded: false,
        }
    }

    /// Source to display right now.
    pub fn current_src(&self) -> &str {
        if self.loaded {
            &self.src
        } else {
            &self.placeholder
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Called when the loader reports the image as ready.
    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }
}
