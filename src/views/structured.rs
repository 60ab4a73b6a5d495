//! Structured (JSON) response rendering.
//!
//! Turns a parsed response into a tree of labelled nodes with human-readable
//! key names. The egui panel walks the tree; the `show` command prints
//! [`StructuredNode::outline`].

use serde_json::Value;

use crate::model::PromptAnnotation;

/// Turn `snake_case` into `Title Case`: underscores become spaces and each
/// word gets an upper-case first letter.
pub fn humanize_key(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

/// Structured form of a prompt result, if one is usable.
///
/// Uses the producer's parsed data when it is an object or array. Data stored
/// as a JSON string, or a `json` response with no parsed data, is parsed from
/// the text. Anything else means the viewer falls back to raw text.
pub fn structured_data(prompt: &PromptAnnotation) -> Option<Value> {
    match &prompt.response_data {
        Some(value @ (Value::Object(_) | Value::Array(_))) => Some(value.clone()),
        Some(Value::String(text)) => parse_container(text),
        Some(_) => None,
        None if prompt.expects_json() => parse_container(&prompt.response),
        None => None,
    }
}

fn parse_container(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(strip_code_fence(text)) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        Ok(_) => None,
        Err(e) => {
            log::debug!("Structured response did not parse: {}", e);
            None
        }
    }
}

/// Content of a structured node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    /// Leaf value, already formatted
    Scalar(String),
    /// Object entries, in source order
    Map(Vec<StructuredNode>),
    /// Array items
    List(Vec<StructuredNode>),
}

/// One node of the structured view.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredNode {
    /// Humanized key (None for array items and the root)
    pub label: Option<String>,
    /// Node content
    pub content: NodeContent,
}

impl StructuredNode {
    /// Build the tree for a JSON value.
    pub fn from_value(value: &Value) -> Self {
        Self::build(None, value)
    }

    fn build(label: Option<String>, value: &Value) -> Self {
        let content = match value {
            Value::Object(map) => NodeContent::Map(
                map.iter()
                    .map(|(key, child)| Self::build(Some(humanize_key(key)), child))
                    .collect(),
            ),
            Value::Array(items) => {
                NodeContent::List(items.iter().map(|item| Self::build(None, item)).collect())
            }
            scalar => NodeContent::Scalar(format_scalar(scalar)),
        };
        Self { label, content }
    }

    /// Check if the node is a leaf.
    pub fn is_scalar(&self) -> bool {
        matches!(self.content, NodeContent::Scalar(_))
    }

    /// Indented plain-text outline, two spaces per level.
    pub fn outline(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.write_outline(0, &mut lines);
        lines
    }

    fn write_outline(&self, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        let children = match &self.content {
            NodeContent::Scalar(text) => {
                match &self.label {
                    Some(label) => lines.push(format!("{}{}: {}", indent, label, text)),
                    None => lines.push(format!("{}- {}", indent, text)),
                }
                return;
            }
            NodeContent::Map(children) | NodeContent::List(children) => children,
        };

        let child_depth = match &self.label {
            Some(label) => {
                lines.push(format!("{}{}:", indent, label));
                depth + 1
            }
            None if depth > 0 => {
                lines.push(format!("{}-", indent));
                depth + 1
            }
            None => depth,
        };

        if children.is_empty() {
            lines.push(format!("{}(empty)", "  ".repeat(child_depth)));
        }
        for child in children {
            child.write_outline(child_depth, lines);
        }
    }
}

/// Format a scalar JSON value for display.
fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_humanize_key() {
        assert_eq!(humanize_key("structured_inventory"), "Structured Inventory");
        assert_eq!(humanize_key("count"), "Count");
        assert_eq!(humanize_key(""), "");
    }

    #[test]
    fn test_humanize_key_keeps_separators() {
        // Only underscores are separators; each one becomes a single space
        assert_eq!(humanize_key("man-made"), "Man-made");
        assert_eq!(humanize_key("odd__key"), "Odd  Key");
        assert_eq!(humanize_key("_private"), " Private");
        assert_eq!(humanize_key("rgbValue"), "RgbValue");
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn test_structured_data_sources() {
        let parsed = PromptAnnotation::json("ignored", json!({"animal": {}}));
        assert_eq!(structured_data(&parsed), Some(json!({"animal": {}})));

        let as_string = PromptAnnotation {
            response_data: Some(Value::String("{\"human\": {}}".into())),
            ..PromptAnnotation::default()
        };
        assert_eq!(structured_data(&as_string), Some(json!({"human": {}})));

        let from_text = PromptAnnotation {
            response: "```json\n[1, 2]\n```".into(),
            response_format: Some("json".into()),
            ..PromptAnnotation::default()
        };
        assert_eq!(structured_data(&from_text), Some(json!([1, 2])));
    }

    #[test]
    fn test_malformed_structured_falls_back() {
        let broken = PromptAnnotation {
            response: "{\"animal\": {\"dog\": ".into(),
            response_format: Some("json".into()),
            ..PromptAnnotation::default()
        };
        assert_eq!(structured_data(&broken), None);

        let scalar = PromptAnnotation {
            response_data: Some(json!(42)),
            ..PromptAnnotation::default()
        };
        assert_eq!(structured_data(&scalar), None);

        assert_eq!(structured_data(&PromptAnnotation::text("plain")), None);
    }

    #[test]
    fn test_tree_and_outline() {
        let value = json!({
            "animal": {"giraffe": {"count": 2, "color": ["brown", "white"]}},
            "natural": {}
        });
        let tree = StructuredNode::from_value(&value);

        let NodeContent::Map(top) = &tree.content else {
            panic!("root should be a map");
        };
        assert_eq!(top[0].label.as_deref(), Some("Animal"));
        assert_eq!(top[1].label.as_deref(), Some("Natural"));

        assert_eq!(
            tree.outline(),
            vec![
                "Animal:",
                "  Giraffe:",
                "    Count: 2",
                "    Color:",
                "      - brown",
                "      - white",
                "Natural:",
                "  (empty)",
            ]
        );
    }

    #[test]
    fn test_scalar_formatting() {
        let tree = StructuredNode::from_value(&json!({"ok": true, "missing": null}));
        assert_eq!(tree.outline(), vec!["Ok: Yes", "Missing: None"]);
    }
}
