#![forbid(unsafe_code)]

//! Tooltip content payloads and rendered metrics.

use unicode_segmentation::UnicodeSegmentation;

/// Handle to host-owned rich content (a `<template>` in a browser host).
///
/// The core never inspects rich content; it only hands the reference to the
/// renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateRef(u64);

impl TemplateRef {
    /// Wrap a raw template handle.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// What a tooltip shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPayload {
    /// Plain text.
    Text(String),
    /// Host-rendered rich content.
    Rich(TemplateRef),
}

impl ContentPayload {
    /// Plain-text payload.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Rich payload.
    #[must_use]
    pub const fn rich(template: TemplateRef) -> Self {
        Self::Rich(template)
    }

    /// Text length in user-perceived characters, `None` for rich content.
    #[must_use]
    pub fn text_len(&self) -> Option<usize> {
        match self {
            Self::Text(text) => Some(text_len(text)),
            Self::Rich(_) => None,
        }
    }
}

impl From<&str> for ContentPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for ContentPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<TemplateRef> for ContentPayload {
    fn from(template: TemplateRef) -> Self {
        Self::Rich(template)
    }
}

/// Length of `text` in extended grapheme clusters.
#[must_use]
pub fn text_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Metrics measured from a mounted tooltip view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContentMetrics {
    /// Rendered scroll height of the content element, in pixels.
    pub scroll_height: f64,
    /// Length of the rendered text content, in characters.
    pub text_len: usize,
}

impl ContentMetrics {
    /// Create a metrics record.
    #[must_use]
    pub const fn new(scroll_height: f64, text_len: usize) -> Self {
        Self {
            scroll_height,
            text_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_len_counts_graphemes() {
        assert_eq!(text_len("abc"), 3);
        assert_eq!(text_len("e\u{301}"), 1);
        assert_eq!(text_len("👨‍👩‍👧"), 1);
        assert_eq!(text_len(""), 0);
    }

    #[test]
    fn payload_len_is_none_for_rich() {
        assert_eq!(ContentPayload::text("hello").text_len(), Some(5));
        assert_eq!(ContentPayload::rich(TemplateRef::new(1)).text_len(), None);
    }

    #[test]
    fn conversions() {
        assert_eq!(ContentPayload::from("x"), ContentPayload::Text("x".into()));
        assert_eq!(
            ContentPayload::from(TemplateRef::new(9)),
            ContentPayload::Rich(TemplateRef::new(9))
        );
    }
}
