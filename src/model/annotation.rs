//! Annotation bundle data structures.
//!
//! A bundle holds every model's output for one image. Files come from the
//! external annotation producer and are only ever read here. Optional fields
//! are tolerated as missing or `null`.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::platform::PlatformInfo;

/// Deserialize `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Image block embedded in a bundle file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleImage {
    /// Image identifier
    pub id: String,
    /// Path of the source image on the producer's machine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Bundle-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// Platform the bundle was generated on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformInfo>,
}

/// All model annotations for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBundle {
    /// Image the bundle describes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<BundleImage>,

    /// One entry per model, in file order
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: Vec<ModelAnnotation>,

    /// Optional generation metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BundleMetadata>,
}

impl AnnotationBundle {
    /// Parse a bundle from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if the bundle has no model annotations.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Look up a model by name. With duplicate names the first entry wins.
    pub fn model(&self, name: &str) -> Option<&ModelAnnotation> {
        self.annotations.iter().find(|a| a.model == name)
    }

    /// Check if a model is present.
    pub fn has_model(&self, name: &str) -> bool {
        self.model(name).is_some()
    }

    /// First model in file order.
    pub fn first_model(&self) -> Option<&ModelAnnotation> {
        self.annotations.first()
    }

    /// Model names in file order.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.annotations.iter().map(|a| a.model.as_str())
    }

    /// Model names that appear more than once.
    pub fn duplicate_models(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for name in self.model_names() {
            if !seen.insert(name) && !duplicates.contains(&name) {
                duplicates.push(name);
            }
        }
        duplicates
    }

    /// Bundle-level platform metadata.
    pub fn platform(&self) -> Option<&PlatformInfo> {
        self.metadata.as_ref().and_then(|m| m.platform.as_ref())
    }

    /// Platform for a model: its own override, else the bundle metadata.
    pub fn platform_for(&self, model: &str) -> Option<&PlatformInfo> {
        self.model(model)
            .and_then(|m| m.platform.as_ref())
            .or_else(|| self.platform())
    }
}

/// One model's output for an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAnnotation {
    /// Model name, e.g. `qwen2.5vl:7b`
    pub model: String,

    /// Sampling temperature used for generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Prompt key to result, in file order. A missing key means "not generated".
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompts: IndexMap<String, PromptAnnotation>,

    /// Platform override for this model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformInfo>,
}

impl ModelAnnotation {
    /// Create a model annotation with no prompts.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            prompts: IndexMap::new(),
            platform: None,
        }
    }

    /// Builder method to add a prompt result.
    pub fn with_prompt(mut self, key: impl Into<String>, prompt: PromptAnnotation) -> Self {
        self.prompts.insert(key.into(), prompt);
        self
    }

    /// Look up a prompt result by key.
    pub fn prompt(&self, key: &str) -> Option<&PromptAnnotation> {
        self.prompts.get(key)
    }

    /// Check if a prompt key exists.
    pub fn has_prompt(&self, key: &str) -> bool {
        self.prompts.contains_key(key)
    }

    /// First prompt key in file order.
    pub fn first_prompt_key(&self) -> Option<&str> {
        self.prompts.keys().next().map(String::as_str)
    }

    /// Prompt keys in file order.
    pub fn prompt_keys(&self) -> impl Iterator<Item = &str> {
        self.prompts.keys().map(String::as_str)
    }
}

/// Result of one prompt for one model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptAnnotation {
    /// Prompt sent to the model
    #[serde(default, alias = "prompt", skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,

    /// Raw model response
    #[serde(default, deserialize_with = "null_as_default")]
    pub response: String,

    /// Expected response format (`text` or `json`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,

    /// Parsed structured response, when the producer could parse one
    #[serde(default, alias = "structured_data", skip_serializing_if = "Option::is_none")]
    pub response_data: Option<Value>,

    /// Generation error reported by the producer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Auxiliary descriptive tag string
    #[serde(default, alias = "hed_annotation", skip_serializing_if = "Option::is_none")]
    pub auxiliary_tag: Option<String>,

    /// Token counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_metrics: Option<TokenMetrics>,

    /// Timing information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_metrics: Option<PerformanceMetrics>,

    /// Quality flags set by the producer's checks
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub quality_flags: Vec<String>,
}

impl PromptAnnotation {
    /// Create a plain-text result.
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            response_format: Some("text".to_string()),
            ..Self::default()
        }
    }

    /// Create a JSON result with its parsed form.
    pub fn json(response: impl Into<String>, data: Value) -> Self {
        Self {
            response: response.into(),
            response_format: Some("json".to_string()),
            response_data: Some(data),
            ..Self::default()
        }
    }

    /// Whether the producer asked for a JSON response.
    pub fn expects_json(&self) -> bool {
        self.response_format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }

    /// Total tokens, if recorded.
    pub fn total_tokens(&self) -> Option<u64> {
        self.token_metrics.as_ref().and_then(TokenMetrics::total)
    }
}

/// Token counts for one generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetrics {
    /// Prompt tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    /// Generated tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    /// Prompt plus generated tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    /// Generation throughput
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_per_second: Option<f64>,
}

impl TokenMetrics {
    /// Total tokens, summing input and output when the total is missing.
    pub fn total(&self) -> Option<u64> {
        self.total_tokens.or(match (self.input_tokens, self.output_tokens) {
            (Some(i), Some(o)) => Some(i + o),
            _ => None,
        })
    }
}

/// Timing information for one generation, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Time spent generating the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_duration_ms: Option<f64>,
    /// Wall-clock time for the whole request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration_ms: Option<f64>,
    /// Model load time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_duration_ms: Option<f64>,
    /// Prompt evaluation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_duration_ms: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "image": {"id": "shared0001_nsd02951", "path": "/nsd/shared0001_nsd02951.jpg"},
        "annotations": [
            {
                "model": "qwen2.5vl:7b",
                "temperature": 0.3,
                "prompts": {
                    "general_description": {
                        "prompt_text": "Describe the image.",
                        "response": "A giraffe in a field.",
                        "response_format": "text",
                        "token_metrics": {"input_tokens": 900, "output_tokens": 120, "total_tokens": 1020},
                        "performance_metrics": {"generation_duration_ms": 2500.0}
                    },
                    "structured_inventory": {
                        "response": "{\"animal\": {\"giraffe\": {\"count\": 1}}}",
                        "response_format": "json",
                        "response_data": {"animal": {"giraffe": {"count": 1}}},
                        "quality_flags": null
                    }
                }
            },
            {
                "model": "gemma3:4b",
                "prompts": null,
                "platform": {"os_name": "Darwin", "os_version": "24.1", "python_version": "3.12.1",
                             "accelerators": [{"name": "Apple M2", "vendor": "apple"}], "compute_backend": "mps"}
            }
        ],
        "metadata": {
            "platform": {"os_name": "Linux", "os_version": "6.8", "python_version": "3.11.9",
                         "accelerators": [{"name": "RTX 4090", "vendor": "nvidia", "memory_mb": 24564}],
                         "compute_backend": "cuda"}
        }
    }"#;

    #[test]
    fn test_parse_sample_bundle() {
        let bundle = AnnotationBundle::from_json(SAMPLE).unwrap();
        assert_eq!(bundle.annotations.len(), 2);
        assert_eq!(bundle.image.as_ref().unwrap().id, "shared0001_nsd02951");

        let qwen = bundle.model("qwen2.5vl:7b").unwrap();
        assert_eq!(qwen.temperature, Some(0.3));
        assert_eq!(qwen.first_prompt_key(), Some("general_description"));
        assert_eq!(
            qwen.prompt_keys().collect::<Vec<_>>(),
            vec!["general_description", "structured_inventory"]
        );

        let general = qwen.prompt("general_description").unwrap();
        assert_eq!(general.prompt_text.as_deref(), Some("Describe the image."));
        assert_eq!(general.total_tokens(), Some(1020));

        let inventory = qwen.prompt("structured_inventory").unwrap();
        assert!(inventory.expects_json());
        assert!(inventory.quality_flags.is_empty());
    }

    #[test]
    fn test_null_prompts_is_empty_map() {
        let bundle = AnnotationBundle::from_json(SAMPLE).unwrap();
        let gemma = bundle.model("gemma3:4b").unwrap();
        assert!(gemma.prompts.is_empty());
        assert_eq!(gemma.first_prompt_key(), None);
    }

    #[test]
    fn test_platform_override() {
        let bundle = AnnotationBundle::from_json(SAMPLE).unwrap();
        assert_eq!(
            bundle.platform_for("gemma3:4b").unwrap().os_name,
            "Darwin"
        );
        assert_eq!(
            bundle.platform_for("qwen2.5vl:7b").unwrap().os_name,
            "Linux"
        );
        assert!(bundle.platform_for("missing").is_some());
    }

    #[test]
    fn test_minimal_bundle() {
        let bundle = AnnotationBundle::from_json(r#"{"annotations": []}"#).unwrap();
        assert!(bundle.is_empty());
        assert!(bundle.platform().is_none());
        assert!(bundle.first_model().is_none());

        let bundle = AnnotationBundle::from_json("{}").unwrap();
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_malformed_bundle_is_error() {
        assert!(AnnotationBundle::from_json("{\"annotations\": [").is_err());
        assert!(AnnotationBundle::from_json(r#"{"annotations": [{"prompts": {}}]}"#).is_err());
    }

    #[test]
    fn test_duplicate_models() {
        let mut bundle = AnnotationBundle::default();
        bundle.annotations.push(ModelAnnotation::new("a"));
        bundle.annotations.push(ModelAnnotation::new("b"));
        bundle.annotations.push(
            ModelAnnotation::new("a").with_prompt("describe", PromptAnnotation::text("x")),
        );
        assert_eq!(bundle.duplicate_models(), vec!["a"]);
        // First entry wins
        assert!(bundle.model("a").unwrap().prompts.is_empty());
    }

    #[test]
    fn test_token_total_fallback() {
        let metrics = TokenMetrics {
            input_tokens: Some(10),
            output_tokens: Some(5),
            ..TokenMetrics::default()
        };
        assert_eq!(metrics.total(), Some(15));
        assert_eq!(TokenMetrics::default().total(), None);
    }

    #[test]
    fn test_prompt_alias_fields() {
        let prompt: PromptAnnotation = serde_json::from_str(
            r#"{"prompt": "p", "response": "r", "hed_annotation": "Sensory-event"}"#,
        )
        .unwrap();
        assert_eq!(prompt.prompt_text.as_deref(), Some("p"));
        assert_eq!(prompt.auxiliary_tag.as_deref(), Some("Sensory-event"));
    }
}
