//! Annotation viewer model.
//!
//! Everything the annotation panel shows, derived from the current
//! [`Resolution`]: the text or structured representation, the payload copied
//! to the clipboard, metrics, auxiliary tag and empty-state messages.

use serde_json::Value;

use super::ViewMode;
use super::structured::{StructuredNode, humanize_key, structured_data};
use crate::model::{ModelAnnotation, PromptAnnotation};
use crate::selection::Resolution;

/// Why there is nothing to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyState {
    /// No model chosen
    NoModelSelected,
    /// Model chosen, prompt type not chosen
    NoPromptSelected {
        /// Selected model
        model: String,
    },
    /// The combination has no data
    NoData {
        /// Selected model
        model: String,
        /// Selected prompt key
        prompt_key: String,
    },
}

impl EmptyState {
    /// User-facing explanation.
    pub fn message(&self) -> String {
        match self {
            EmptyState::NoModelSelected => "Select a model to view its annotations.".to_string(),
            EmptyState::NoPromptSelected { model } => {
                format!("Select a prompt type to view the {} annotation.", model)
            }
            EmptyState::NoData { model, prompt_key } => format!(
                "No annotation available for {} with prompt \"{}\".",
                model,
                humanize_key(prompt_key)
            ),
        }
    }
}

/// Auxiliary tag display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryTag<'a> {
    /// Tag text recorded by the producer
    Present(&'a str),
    /// No tag yet; link to the external tagging tool
    Missing {
        /// External tool URL
        link: &'a str,
    },
}

/// One label/value metric row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricLine {
    /// Metric name
    pub label: &'static str,
    /// Formatted value
    pub value: String,
}

/// The annotation panel: either an annotation or an explanation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationPanel<'a> {
    Empty(EmptyState),
    Annotation(AnnotationView<'a>),
}

impl<'a> AnnotationPanel<'a> {
    /// Build the panel for a resolution.
    pub fn build(resolution: Resolution<'a>, mode: ViewMode, tag_link: &'a str) -> Self {
        match resolution {
            Resolution::NoModelSelected => Self::Empty(EmptyState::NoModelSelected),
            Resolution::NoPromptSelected { model } => Self::Empty(EmptyState::NoPromptSelected {
                model: model.to_string(),
            }),
            Resolution::NoData { model, prompt_key } => Self::Empty(EmptyState::NoData {
                model: model.to_string(),
                prompt_key: prompt_key.to_string(),
            }),
            Resolution::Found {
                model,
                prompt_key,
                prompt,
            } => Self::Annotation(AnnotationView::new(model, prompt_key, prompt, mode, tag_link)),
        }
    }

    /// The annotation view, if there is one.
    pub fn view(&self) -> Option<&AnnotationView<'a>> {
        match self {
            Self::Annotation(view) => Some(view),
            Self::Empty(_) => None,
        }
    }
}

/// A resolved annotation ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationView<'a> {
    /// Model entry
    pub model: &'a ModelAnnotation,
    /// Prompt key
    pub prompt_key: &'a str,
    /// Prompt result
    pub prompt: &'a PromptAnnotation,
    /// Parsed structured data, if usable
    structured: Option<Value>,
    /// Mode the user asked for
    requested_mode: ViewMode,
    /// External link for missing auxiliary tags
    tag_link: &'a str,
}

impl<'a> AnnotationView<'a> {
    /// Create a view for one prompt result.
    pub fn new(
        model: &'a ModelAnnotation,
        prompt_key: &'a str,
        prompt: &'a PromptAnnotation,
        requested_mode: ViewMode,
        tag_link: &'a str,
    ) -> Self {
        Self {
            model,
            prompt_key,
            prompt,
            structured: structured_data(prompt),
            requested_mode,
            tag_link,
        }
    }

    /// Heading, e.g. `gemma3:4b: Structured Inventory`.
    pub fn title(&self) -> String {
        format!("{}: {}", self.model.model, humanize_key(self.prompt_key))
    }

    /// Whether the structured toggle should be offered.
    pub fn has_structured(&self) -> bool {
        self.structured.is_some()
    }

    /// Mode actually shown; structured falls back to text when unavailable.
    pub fn mode(&self) -> ViewMode {
        match self.requested_mode {
            ViewMode::Structured if self.has_structured() => ViewMode::Structured,
            _ => ViewMode::Text,
        }
    }

    /// Raw response text.
    pub fn response_text(&self) -> &str {
        &self.prompt.response
    }

    /// Structured tree, when structured data is usable.
    pub fn structured_tree(&self) -> Option<StructuredNode> {
        self.structured.as_ref().map(StructuredNode::from_value)
    }

    /// Text copied by the copy button: the verbatim response in text mode,
    /// pretty-printed JSON in structured mode.
    pub fn copy_payload(&self) -> String {
        match (self.mode(), &self.structured) {
            (ViewMode::Structured, Some(value)) => serde_json::to_string_pretty(value)
                .unwrap_or_else(|_| self.prompt.response.clone()),
            _ => self.prompt.response.clone(),
        }
    }

    /// Token and timing rows, only for values that were recorded.
    pub fn metrics(&self) -> Vec<MetricLine> {
        let mut lines = Vec::new();

        if let Some(tokens) = &self.prompt.token_metrics {
            if let Some(input) = tokens.input_tokens {
                lines.push(MetricLine {
                    label: "Input tokens",
                    value: format_count(input),
                });
            }
            if let Some(output) = tokens.output_tokens {
                lines.push(MetricLine {
                    label: "Output tokens",
                    value: format_count(output),
                });
            }
            if let Some(total) = tokens.total() {
                lines.push(MetricLine {
                    label: "Total tokens",
                    value: format_count(total),
                });
            }
        }

        if let Some(perf) = &self.prompt.performance_metrics {
            if let Some(ms) = perf.generation_duration_ms {
                lines.push(MetricLine {
                    label: "Generation time",
                    value: format_duration_ms(ms),
                });
            }
            if let Some(ms) = perf.total_duration_ms {
                lines.push(MetricLine {
                    label: "Total time",
                    value: format_duration_ms(ms),
                });
            }
        }

        if let Some(rate) = self.tokens_per_second() {
            lines.push(MetricLine {
                label: "Speed",
                value: format!("{:.1} tok/s", rate),
            });
        }

        if let Some(temperature) = self.model.temperature {
            lines.push(MetricLine {
                label: "Temperature",
                value: format!("{}", temperature),
            });
        }

        lines
    }

    /// Recorded throughput, or output tokens over generation time.
    pub fn tokens_per_second(&self) -> Option<f64> {
        let tokens = self.prompt.token_metrics.as_ref()?;
        if let Some(rate) = tokens.tokens_per_second {
            return Some(rate);
        }
        let output = tokens.output_tokens?;
        let ms = self
            .prompt
            .performance_metrics
            .as_ref()?
            .generation_duration_ms?;
        (ms > 0.0).then(|| output as f64 / (ms / 1000.0))
    }

    /// Auxiliary tag or the link to create one.
    pub fn auxiliary_tag(&self) -> AuxiliaryTag<'_> {
        match self.prompt.auxiliary_tag.as_deref() {
            Some(tag) if !tag.trim().is_empty() => AuxiliaryTag::Present(tag),
            _ => AuxiliaryTag::Missing {
                link: self.tag_link,
            },
        }
    }

    /// Producer's generation error, if any.
    pub fn error(&self) -> Option<&str> {
        self.prompt.error.as_deref()
    }

    /// Producer's quality flags (display only).
    pub fn quality_flags(&self) -> &[String] {
        &self.prompt.quality_flags
    }
}

/// Format an integer with thousands separators.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format milliseconds as `850 ms` or `3.42 s`.
pub fn format_duration_ms(ms: f64) -> String {
    if ms < 1000.0 {
        format!("{:.0} ms", ms)
    } else {
        format!("{:.2} s", ms / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PerformanceMetrics, TokenMetrics};
    use serde_json::json;

    const LINK: &str = "https://tags.example.org";

    fn inventory_prompt() -> PromptAnnotation {
        PromptAnnotation::json(
            "{\"animal\": {\"dog\": {\"count\": 1}}}",
            json!({"animal": {"dog": {"count": 1}}}),
        )
    }

    #[test]
    fn test_empty_messages_are_distinct() {
        let a = EmptyState::NoModelSelected.message();
        let b = EmptyState::NoPromptSelected { model: "m".into() }.message();
        let c = EmptyState::NoData {
            model: "m".into(),
            prompt_key: "mood_emotions".into(),
        }
        .message();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(c.contains("Mood Emotions"));
    }

    #[test]
    fn test_mode_falls_back_to_text() {
        let model = ModelAnnotation::new("m");
        let prompt = PromptAnnotation::text("plain words");
        let view = AnnotationView::new(&model, "describe", &prompt, ViewMode::Structured, LINK);
        assert!(!view.has_structured());
        assert_eq!(view.mode(), ViewMode::Text);
        assert_eq!(view.copy_payload(), "plain words");
    }

    #[test]
    fn test_copy_payload_roundtrip() {
        let model = ModelAnnotation::new("m");
        let prompt = inventory_prompt();

        let text = AnnotationView::new(&model, "structured_inventory", &prompt, ViewMode::Text, LINK);
        assert_eq!(text.copy_payload(), prompt.response);

        let structured =
            AnnotationView::new(&model, "structured_inventory", &prompt, ViewMode::Structured, LINK);
        assert_eq!(structured.mode(), ViewMode::Structured);
        let copied: Value = serde_json::from_str(&structured.copy_payload()).unwrap();
        assert_eq!(copied, json!({"animal": {"dog": {"count": 1}}}));
    }

    #[test]
    fn test_metrics() {
        let mut model = ModelAnnotation::new("m");
        model.temperature = Some(0.2);
        let prompt = PromptAnnotation {
            token_metrics: Some(TokenMetrics {
                input_tokens: Some(1200),
                output_tokens: Some(300),
                total_tokens: None,
                tokens_per_second: None,
            }),
            performance_metrics: Some(PerformanceMetrics {
                generation_duration_ms: Some(6000.0),
                ..PerformanceMetrics::default()
            }),
            ..PromptAnnotation::text("x")
        };
        let view = AnnotationView::new(&model, "k", &prompt, ViewMode::Text, LINK);
        let metrics = view.metrics();

        let find = |label: &str| {
            metrics
                .iter()
                .find(|m| m.label == label)
                .map(|m| m.value.clone())
        };
        assert_eq!(find("Input tokens").as_deref(), Some("1,200"));
        assert_eq!(find("Total tokens").as_deref(), Some("1,500"));
        assert_eq!(find("Generation time").as_deref(), Some("6.00 s"));
        assert_eq!(find("Speed").as_deref(), Some("50.0 tok/s"));
        assert_eq!(find("Temperature").as_deref(), Some("0.2"));
        assert_eq!(find("Total time"), None);
    }

    #[test]
    fn test_no_metrics_when_absent() {
        let model = ModelAnnotation::new("m");
        let prompt = PromptAnnotation::text("x");
        let view = AnnotationView::new(&model, "k", &prompt, ViewMode::Text, LINK);
        assert!(view.metrics().is_empty());
    }

    #[test]
    fn test_auxiliary_tag() {
        let model = ModelAnnotation::new("m");
        let mut prompt = PromptAnnotation::text("x");
        let view = AnnotationView::new(&model, "k", &prompt, ViewMode::Text, LINK);
        assert_eq!(view.auxiliary_tag(), AuxiliaryTag::Missing { link: LINK });

        prompt.auxiliary_tag = Some("Sensory-event".into());
        let view = AnnotationView::new(&model, "k", &prompt, ViewMode::Text, LINK);
        assert_eq!(view.auxiliary_tag(), AuxiliaryTag::Present("Sensory-event"));
    }

    #[test]
    fn test_panel_build() {
        let model = ModelAnnotation::new("gemma3:4b");
        let prompt = inventory_prompt();
        let panel = AnnotationPanel::build(
            Resolution::Found {
                model: &model,
                prompt_key: "structured_inventory",
                prompt: &prompt,
            },
            ViewMode::Text,
            LINK,
        );
        let view = panel.view().unwrap();
        assert_eq!(view.title(), "gemma3:4b: Structured Inventory");

        let panel = AnnotationPanel::build(Resolution::NoModelSelected, ViewMode::Text, LINK);
        assert_eq!(panel, AnnotationPanel::Empty(EmptyState::NoModelSelected));
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_duration_ms(850.4), "850 ms");
        assert_eq!(format_duration_ms(3420.0), "3.42 s");
    }
}
