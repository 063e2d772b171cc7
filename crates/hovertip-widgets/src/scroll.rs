#![forbid(unsafe_code)]

//! Scrollability heuristics.
//!
//! Two independent decisions:
//!
//! - **provisional**, before anything renders: long plain text or any rich
//!   content. The renderer mounts the panel with internal scrolling enabled
//!   when this is set.
//! - **measured**, after mount: the rendered scroll height or text length of
//!   the panel's content element.
//!
//! The measured decision is authoritative once available.

use hovertip_core::content::{ContentMetrics, ContentPayload};
use hovertip_runtime::ScrollPolicy;

/// Scrollability thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollHeuristics {
    pub text_length_threshold: usize,
    pub rendered_height_threshold: f64,
    pub rendered_text_threshold: usize,
}

impl Default for ScrollHeuristics {
    fn default() -> Self {
        Self::from_policy(&ScrollPolicy::default())
    }
}

impl ScrollHeuristics {
    #[must_use]
    pub fn from_policy(policy: &ScrollPolicy) -> Self {
        Self {
            text_length_threshold: policy.text_length_threshold,
            rendered_height_threshold: policy.rendered_height_threshold,
            rendered_text_threshold: policy.rendered_text_threshold,
        }
    }

    /// Pre-render decision.
    #[must_use]
    pub fn provisional(&self, content: &ContentPayload) -> bool {
        match content.text_len() {
            Some(len) => len > self.text_length_threshold,
            None => true,
        }
    }

    /// Post-render decision.
    #[must_use]
    pub fn measured(&self, metrics: ContentMetrics) -> bool {
        metrics.scroll_height > self.rendered_height_threshold
            || metrics.text_len > self.rendered_text_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hovertip_core::content::TemplateRef;

    #[test]
    fn provisional_text_boundary() {
        let h = ScrollHeuristics::default();
        assert!(h.provisional(&ContentPayload::text("x".repeat(101))));
        assert!(!h.provisional(&ContentPayload::text("x".repeat(100))));
        assert!(!h.provisional(&ContentPayload::text("")));
    }

    #[test]
    fn provisional_rich_always_scrolls() {
        let h = ScrollHeuristics::default();
        assert!(h.provisional(&ContentPayload::rich(TemplateRef::new(1))));
    }

    #[test]
    fn provisional_counts_graphemes_not_bytes() {
        let h = ScrollHeuristics::default();
        // 100 two-byte characters: 200 bytes, 100 graphemes.
        assert!(!h.provisional(&ContentPayload::text("é".repeat(100))));
    }

    #[test]
    fn measured_height_boundary() {
        let h = ScrollHeuristics::default();
        assert!(h.measured(ContentMetrics::new(201.0, 10)));
        assert!(!h.measured(ContentMetrics::new(200.0, 10)));
    }

    #[test]
    fn measured_text_boundary() {
        let h = ScrollHeuristics::default();
        assert!(h.measured(ContentMetrics::new(50.0, 601)));
        assert!(!h.measured(ContentMetrics::new(50.0, 600)));
        assert!(!h.measured(ContentMetrics::new(50.0, 50)));
    }
}
