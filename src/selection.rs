//! Sticky model/prompt selection.
//!
//! The selection survives image navigation as long as it stays valid, so a
//! user can hold one model and prompt type fixed while scanning images. When
//! a newly loaded bundle invalidates it, the selection falls back to the
//! bundle's first model and/or that model's first prompt key.
//!
//! [`reconcile`] is a pure function from (old selection, event) to the new
//! selection; it has no knowledge of fetching or rendering.

use crate::model::{AnnotationBundle, ModelAnnotation, PromptAnnotation};

/// Current model and prompt choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected model name
    pub model: Option<String>,
    /// Selected prompt key
    pub prompt_key: Option<String>,
}

impl Selection {
    /// Create a selection from optional parts.
    pub fn new(model: Option<&str>, prompt_key: Option<&str>) -> Self {
        Self {
            model: model.map(str::to_string),
            prompt_key: prompt_key.map(str::to_string),
        }
    }

    /// Selection pointing at a model's first prompt.
    fn defaults_for(model: &ModelAnnotation) -> Self {
        Self {
            model: Some(model.model.clone()),
            prompt_key: model.first_prompt_key().map(str::to_string),
        }
    }
}

/// Inputs that can change the selection.
#[derive(Debug, Clone, Copy)]
pub enum SelectionEvent<'a> {
    /// A bundle finished loading for the active image
    BundleLoaded(&'a AnnotationBundle),
    /// The user picked a model
    SelectModel(&'a str),
    /// The user picked a prompt type
    SelectPrompt(&'a str),
}

/// Compute the selection that follows an event.
pub fn reconcile(current: &Selection, event: SelectionEvent<'_>) -> Selection {
    match event {
        SelectionEvent::BundleLoaded(bundle) => reconcile_bundle(current, bundle),
        // A manual model change always re-opens the prompt choice
        SelectionEvent::SelectModel(model) => Selection {
            model: Some(model.to_string()),
            prompt_key: None,
        },
        SelectionEvent::SelectPrompt(key) => Selection {
            model: current.model.clone(),
            prompt_key: Some(key.to_string()),
        },
    }
}

fn reconcile_bundle(current: &Selection, bundle: &AnnotationBundle) -> Selection {
    let Some(first) = bundle.first_model() else {
        // Nothing to fall back to; the selection simply won't resolve
        return current.clone();
    };

    let retained = current
        .model
        .as_deref()
        .and_then(|name| bundle.model(name));

    let Some(model) = retained else {
        return Selection::defaults_for(first);
    };

    let prompt_valid = current
        .prompt_key
        .as_deref()
        .is_some_and(|key| model.has_prompt(key));

    if prompt_valid {
        current.clone()
    } else {
        Selection::defaults_for(model)
    }
}

/// What the current selection points at in a bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// No model chosen
    NoModelSelected,
    /// Model chosen, prompt type not chosen
    NoPromptSelected {
        /// The selected model
        model: &'a str,
    },
    /// The combination has no data in this bundle
    NoData {
        /// The selected model
        model: &'a str,
        /// The selected prompt key
        prompt_key: &'a str,
    },
    /// The selected annotation
    Found {
        /// Model entry
        model: &'a ModelAnnotation,
        /// Prompt key
        prompt_key: &'a str,
        /// Prompt result
        prompt: &'a PromptAnnotation,
    },
}

/// Resolve a selection against a bundle (absent bundle means no data).
pub fn resolve<'a>(
    bundle: Option<&'a AnnotationBundle>,
    selection: &'a Selection,
) -> Resolution<'a> {
    let Some(model_name) = selection.model.as_deref() else {
        return Resolution::NoModelSelected;
    };
    let Some(prompt_key) = selection.prompt_key.as_deref() else {
        return Resolution::NoPromptSelected { model: model_name };
    };

    let found = bundle
        .and_then(|b| b.model(model_name))
        .and_then(|m| m.prompt(prompt_key).map(|p| (m, p)));

    match found {
        Some((model, prompt)) => Resolution::Found {
            model,
            prompt_key,
            prompt,
        },
        None => Resolution::NoData {
            model: model_name,
            prompt_key,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str, prompts: &[&str]) -> ModelAnnotation {
        prompts.iter().fold(ModelAnnotation::new(name), |m, key| {
            m.with_prompt(*key, PromptAnnotation::text(format!("{} says {}", name, key)))
        })
    }

    fn bundle(models: Vec<ModelAnnotation>) -> AnnotationBundle {
        AnnotationBundle {
            annotations: models,
            ..AnnotationBundle::default()
        }
    }

    #[test]
    fn test_initial_load_picks_defaults() {
        let b = bundle(vec![
            model("qwen2.5vl:7b", &["general_description", "mood_emotions"]),
            model("llava:latest", &["describe"]),
        ]);
        let next = reconcile(&Selection::default(), SelectionEvent::BundleLoaded(&b));
        assert_eq!(next, Selection::new(Some("qwen2.5vl:7b"), Some("general_description")));
    }

    #[test]
    fn test_absent_model_resets_to_first() {
        // Bundle A had both models; bundle B only has qwen
        let b = bundle(vec![model("qwen2.5vl:7b", &["general_description", "describe"])]);
        let current = Selection::new(Some("llava:latest"), Some("describe"));

        let next = reconcile(&current, SelectionEvent::BundleLoaded(&b));
        assert_eq!(next, Selection::new(Some("qwen2.5vl:7b"), Some("general_description")));
    }

    #[test]
    fn test_present_model_missing_prompt_resets_prompt_only() {
        let b = bundle(vec![
            model("qwen2.5vl:7b", &["general_description"]),
            model("gemma3:4b", &["mood_emotions", "general_description"]),
        ]);
        let current = Selection::new(Some("gemma3:4b"), Some("structured_inventory"));

        let next = reconcile(&current, SelectionEvent::BundleLoaded(&b));
        assert_eq!(next, Selection::new(Some("gemma3:4b"), Some("mood_emotions")));
    }

    #[test]
    fn test_sticky_selection_kept() {
        let b = bundle(vec![
            model("qwen2.5vl:7b", &["general_description", "mood_emotions"]),
            model("gemma3:4b", &["general_description", "mood_emotions"]),
        ]);
        let current = Selection::new(Some("gemma3:4b"), Some("mood_emotions"));
        assert_eq!(reconcile(&current, SelectionEvent::BundleLoaded(&b)), current);
    }

    #[test]
    fn test_empty_bundle_leaves_selection() {
        let current = Selection::new(Some("gemma3:4b"), Some("mood_emotions"));
        let next = reconcile(&current, SelectionEvent::BundleLoaded(&AnnotationBundle::default()));
        assert_eq!(next, current);

        let next = reconcile(
            &Selection::default(),
            SelectionEvent::BundleLoaded(&AnnotationBundle::default()),
        );
        assert_eq!(next, Selection::default());
    }

    #[test]
    fn test_retained_model_without_prompts_clears_prompt() {
        let b = bundle(vec![model("a", &["x"]), model("b", &[])]);
        let current = Selection::new(Some("b"), Some("x"));
        let next = reconcile(&current, SelectionEvent::BundleLoaded(&b));
        assert_eq!(next, Selection::new(Some("b"), None));
        assert_eq!(resolve(Some(&b), &next), Resolution::NoPromptSelected { model: "b" });
    }

    #[test]
    fn test_model_selected_without_prompt_gets_first_prompt_on_load() {
        let b = bundle(vec![model("a", &["x", "y"]), model("b", &["y", "z"])]);
        let current = Selection::new(Some("b"), None);
        let next = reconcile(&current, SelectionEvent::BundleLoaded(&b));
        assert_eq!(next, Selection::new(Some("b"), Some("y")));
    }

    #[test]
    fn test_select_model_clears_prompt() {
        let current = Selection::new(Some("a"), Some("x"));
        let next = reconcile(&current, SelectionEvent::SelectModel("b"));
        assert_eq!(next, Selection::new(Some("b"), None));
    }

    #[test]
    fn test_select_prompt_keeps_model() {
        let current = Selection::new(Some("a"), Some("x"));
        let next = reconcile(&current, SelectionEvent::SelectPrompt("y"));
        assert_eq!(next, Selection::new(Some("a"), Some("y")));
    }

    #[test]
    fn test_resolve_states() {
        let b = bundle(vec![model("a", &["x"])]);

        assert_eq!(resolve(Some(&b), &Selection::default()), Resolution::NoModelSelected);
        assert_eq!(
            resolve(Some(&b), &Selection::new(Some("a"), Some("y"))),
            Resolution::NoData { model: "a", prompt_key: "y" }
        );
        assert_eq!(
            resolve(None, &Selection::new(Some("a"), Some("x"))),
            Resolution::NoData { model: "a", prompt_key: "x" }
        );

        let selection = Selection::new(Some("a"), Some("x"));
        match resolve(Some(&b), &selection) {
            Resolution::Found { model, prompt_key, prompt } => {
                assert_eq!(model.model, "a");
                assert_eq!(prompt_key, "x");
                assert_eq!(prompt.response, "a says x");
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }
}
