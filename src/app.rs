//! The dashboard coordinator, shared between the web and terminal front-ends.
//!
//! [`Dashboard`] owns every piece of mutable viewer state. Front-ends feed it
//! [`Message`]s and carry out the [`Command`]s it returns; it never performs
//! I/O itself, which keeps it fully testable.

use crate::cache::{BundleCache, FetchOutcome, FetchTicket};
use crate::config::ViewerConfig;
use crate::constants::DEFAULT_STRIP_VIEWPORT;
use crate::error::FetchError;
use crate::manifest::{ManifestLoad, ManifestState};
use crate::message::{Command, Message};
use crate::model::{AnnotationBundle, HumanReference, ImageRecord, PlatformInfo, ReferenceSet};
use crate::navigation::{Direction, ThumbnailStrip};
use crate::selection::{Resolution, Selection, SelectionEvent, reconcile, resolve};
use crate::views::{AnnotationPanel, PlatformBadge, ViewMode};

/// Viewer state for one session.
pub struct Dashboard {
    // === Configuration ===
    config: ViewerConfig,

    // === Image list ===
    /// Images in manifest order
    images: Vec<ImageRecord>,
    /// Manifest loading state
    manifest_state: ManifestState,
    /// Optional human reference descriptions
    references: ReferenceSet,

    // === Annotations ===
    /// Fetched bundles by image id
    cache: BundleCache,
    /// Bundle fetch for the active image, while in flight
    active_fetch: Option<FetchTicket>,

    // === UI state ===
    /// Sticky model/prompt choice
    selection: Selection,
    /// Active index and strip scroll
    strip: ThumbnailStrip,
    /// Requested response representation
    view_mode: ViewMode,
    /// Status line text
    status_message: Option<String>,
}

impl Dashboard {
    /// Create a dashboard and the commands that start loading.
    pub fn new(config: ViewerConfig) -> (Self, Vec<Command>) {
        let mut commands = vec![Command::FetchManifest {
            path: config.manifest_location(),
        }];
        if let Some(path) = config.reference_location() {
            commands.push(Command::FetchReferences { path });
        }

        let dashboard = Self {
            strip: ThumbnailStrip::new(config.thumbnail_extent, DEFAULT_STRIP_VIEWPORT),
            view_mode: config.default_view_mode,
            config,
            images: Vec::new(),
            manifest_state: ManifestState::Loading,
            references: ReferenceSet::default(),
            cache: BundleCache::new(),
            active_fetch: None,
            selection: Selection::default(),
            status_message: Some("Loading manifest...".to_string()),
        };

        (dashboard, commands)
    }

    /// Apply a message and return the side effects it requires.
    pub fn update(&mut self, message: Message) -> Vec<Command> {
        let mut commands = Vec::new();

        match message {
            // Loading
            Message::ManifestFetched(result) => self.handle_manifest(result, &mut commands),
            Message::ReferencesFetched(result) => self.handle_references(result),
            Message::BundleFetched { ticket, result } => self.handle_bundle(ticket, result),

            // Navigation
            Message::PrevImage => {
                if self.strip.step(Direction::Previous) {
                    self.activate(&mut commands);
                }
            }
            Message::NextImage => {
                if self.strip.step(Direction::Next) {
                    self.activate(&mut commands);
                }
            }
            Message::JumpTo(index) => {
                if self.strip.jump_to(index) {
                    self.activate(&mut commands);
                }
            }
            Message::ScrubTo(fraction) => {
                if self.strip.scrub_to(fraction) {
                    self.activate(&mut commands);
                }
            }
            Message::ViewportResized(extent) => self.strip.set_viewport(extent),

            // Selection
            Message::SelectModel(model) => {
                self.selection = reconcile(&self.selection, SelectionEvent::SelectModel(&model));
                log::debug!("Model selected: {}", model);
            }
            Message::SelectPrompt(key) => {
                self.selection = reconcile(&self.selection, SelectionEvent::SelectPrompt(&key));
                log::debug!("Prompt selected: {}", key);
            }

            // Annotation viewer
            Message::ToggleViewMode => self.view_mode = self.view_mode.toggle(),
            Message::SetViewMode(mode) => self.view_mode = mode,
            Message::Copy => match self.panel().view() {
                Some(view) => commands.push(Command::CopyToClipboard(view.copy_payload())),
                None => log::debug!("Copy requested with no annotation displayed"),
            },
        }

        commands
    }

    fn handle_manifest(&mut self, result: Result<String, FetchError>, commands: &mut Vec<Command>) {
        let load = ManifestLoad::from_fetch(result, &self.config.paths);

        self.status_message = match &load.state {
            ManifestState::Failed(reason) => Some(format!("Failed to load images: {}", reason)),
            ManifestState::Ready(0) => Some("The manifest lists no images".to_string()),
            _ => None,
        };

        self.images = load.images;
        self.manifest_state = load.state;
        self.cache.clear();
        self.active_fetch = None;
        self.strip.set_len(self.images.len());

        if !self.images.is_empty() {
            self.activate(commands);
        }
    }

    fn handle_references(&mut self, result: Result<String, FetchError>) {
        let text = match result {
            Ok(text) => text,
            Err(FetchError::NotFound { path }) => {
                log::debug!("No reference file at {}", path);
                return;
            }
            Err(e) => {
                log::warn!("Failed to fetch reference file: {}", e);
                return;
            }
        };

        match ReferenceSet::from_json(&text) {
            Ok(references) => {
                log::info!("Loaded {} reference descriptions", references.len());
                self.references = references;
            }
            Err(e) => log::warn!("Failed to parse reference file: {}", e),
        }
    }

    fn handle_bundle(&mut self, ticket: FetchTicket, result: Result<String, FetchError>) {
        if self.active_fetch.as_ref() == Some(&ticket) {
            self.active_fetch = None;
        }

        let outcome = self.cache.complete(&ticket, result);
        let is_active = self.active_id() == Some(ticket.image_id.as_str());

        match outcome {
            FetchOutcome::Applied if is_active => {
                self.status_message = None;
                self.reconcile_with_cache();
            }
            FetchOutcome::Failed if is_active => {
                self.status_message =
                    Some(format!("Annotations unavailable for {}", ticket.image_id));
            }
            _ => {}
        }
    }

    /// The active image changed: abort the superseded fetch, show any cached
    /// bundle right away and refetch.
    fn activate(&mut self, commands: &mut Vec<Command>) {
        if let Some(previous) = self.active_fetch.take() {
            if self.cache.in_flight(&previous.image_id).as_ref() == Some(&previous) {
                log::debug!("Aborting bundle fetch #{} for {}", previous.seq, previous.image_id);
                commands.push(Command::AbortFetch(previous));
            }
        }

        let Some(record) = self.active_image().cloned() else {
            return;
        };
        log::info!("Active image: {}", record.id);

        self.status_message = None;
        self.reconcile_with_cache();

        let ticket = self.cache.begin(&record.id);
        self.active_fetch = Some(ticket.clone());
        commands.push(Command::FetchBundle {
            ticket,
            path: record.bundle_path,
        });
    }

    fn reconcile_with_cache(&mut self) {
        let Some(id) = self.active_id() else {
            return;
        };
        if let Some(bundle) = self.cache.get(id) {
            self.selection = reconcile(&self.selection, SelectionEvent::BundleLoaded(bundle));
        }
    }

    // === Accessors ===

    /// Active configuration.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Images in manifest order.
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// Manifest loading state.
    pub fn manifest_state(&self) -> &ManifestState {
        &self.manifest_state
    }

    /// Thumbnail strip state.
    pub fn strip(&self) -> &ThumbnailStrip {
        &self.strip
    }

    /// Active image index.
    pub fn active_index(&self) -> Option<usize> {
        self.strip.active()
    }

    /// Active image record.
    pub fn active_image(&self) -> Option<&ImageRecord> {
        self.active_index().and_then(|i| self.images.get(i))
    }

    fn active_id(&self) -> Option<&str> {
        self.active_image().map(|r| r.id.as_str())
    }

    /// Current model/prompt selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Requested view mode.
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Status line text, if any.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Cached bundle for the active image.
    pub fn current_bundle(&self) -> Option<&AnnotationBundle> {
        self.active_id().and_then(|id| self.cache.get(id))
    }

    /// Whether a bundle fetch for the active image is in flight.
    pub fn is_loading_bundle(&self) -> bool {
        self.active_fetch.is_some()
    }

    /// Model names of the active bundle, in file order.
    pub fn model_names(&self) -> Vec<&str> {
        self.current_bundle()
            .map(|b| b.model_names().collect())
            .unwrap_or_default()
    }

    /// Prompt keys of the selected model in the active bundle.
    pub fn prompt_keys(&self) -> Vec<&str> {
        let model = self
            .selection
            .model
            .as_deref()
            .zip(self.current_bundle())
            .and_then(|(name, bundle)| bundle.model(name));
        model.map(|m| m.prompt_keys().collect()).unwrap_or_default()
    }

    /// What the selection points at in the active bundle.
    pub fn resolution(&self) -> Resolution<'_> {
        resolve(self.current_bundle(), &self.selection)
    }

    /// Annotation panel for the current state.
    pub fn panel(&self) -> AnnotationPanel<'_> {
        AnnotationPanel::build(
            self.resolution(),
            self.view_mode,
            &self.config.auxiliary_tag_link,
        )
    }

    /// Platform of the active bundle, preferring the selected model's override.
    pub fn platform(&self) -> Option<&PlatformInfo> {
        let bundle = self.current_bundle()?;
        match self.selection.model.as_deref() {
            Some(model) => bundle.platform_for(model),
            None => bundle.platform(),
        }
    }

    /// Platform badge for the active bundle.
    pub fn badge(&self) -> Option<PlatformBadge> {
        PlatformBadge::from_platform(self.platform())
    }

    /// Human reference for the active image.
    pub fn reference(&self) -> Option<&HumanReference> {
        self.active_id().and_then(|id| self.references.get(id))
    }
}
