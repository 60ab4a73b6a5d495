//! Annotation bundle cache with request tagging.
//!
//! Bundles are fetched lazily, one image at a time, and replace any earlier
//! entry for the same image wholesale. Every fetch is tagged with a monotonic
//! sequence number; a completion is only applied if its ticket is still the
//! latest one issued for that image, so out-of-order completions can never
//! overwrite newer data.

use std::collections::{HashMap, HashSet};

use crate::error::FetchError;
use crate::model::{AnnotationBundle, PlatformInfo};

/// Tag identifying one bundle fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    /// Monotonic sequence number, unique per cache
    pub seq: u64,
    /// Image the fetch is for
    pub image_id: String,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Parsed and stored
    Applied,
    /// A newer fetch for the same image was issued; result discarded
    Stale,
    /// The fetch was aborted
    Cancelled,
    /// Fetch or parse failed; any earlier entry is kept
    Failed,
}

/// In-memory map from image id to its most recently fetched bundle.
#[derive(Debug, Default)]
pub struct BundleCache {
    /// Parsed bundles by image id
    bundles: HashMap<String, AnnotationBundle>,
    /// Latest issued sequence number per image id
    latest: HashMap<String, u64>,
    /// Sequence numbers of fetches not yet completed
    pending: HashSet<u64>,
    /// Next sequence number to hand out
    next_seq: u64,
}

impl BundleCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch for an image; the returned ticket supersedes earlier ones.
    pub fn begin(&mut self, image_id: &str) -> FetchTicket {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.latest.insert(image_id.to_string(), seq);
        self.pending.insert(seq);

        log::debug!("Bundle fetch #{} started for {}", seq, image_id);

        FetchTicket {
            seq,
            image_id: image_id.to_string(),
        }
    }

    /// Check if a ticket is the latest one issued for its image.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest.get(&ticket.image_id) == Some(&ticket.seq)
    }

    /// The latest fetch for an image, if it has not completed yet.
    pub fn in_flight(&self, image_id: &str) -> Option<FetchTicket> {
        let seq = *self.latest.get(image_id)?;
        self.pending.contains(&seq).then(|| FetchTicket {
            seq,
            image_id: image_id.to_string(),
        })
    }

    /// Number of fetches not yet completed.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Record the completion of a fetch.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<String, FetchError>,
    ) -> FetchOutcome {
        self.pending.remove(&ticket.seq);

        if !self.is_current(ticket) {
            log::debug!(
                "Discarding stale bundle fetch #{} for {}",
                ticket.seq,
                ticket.image_id
            );
            return FetchOutcome::Stale;
        }

        let text = match result {
            Ok(text) => text,
            Err(e) if e.is_aborted() => {
                log::debug!("Bundle fetch #{} for {} aborted", ticket.seq, ticket.image_id);
                return FetchOutcome::Cancelled;
            }
            Err(e) => {
                log::error!("Failed to fetch annotations for {}: {}", ticket.image_id, e);
                return FetchOutcome::Failed;
            }
        };

        match AnnotationBundle::from_json(&text) {
            Ok(bundle) => {
                let duplicates = bundle.duplicate_models();
                if !duplicates.is_empty() {
                    log::warn!(
                        "Bundle for {} lists models more than once: {:?}",
                        ticket.image_id,
                        duplicates
                    );
                }
                log::info!(
                    "Loaded {} model annotations for {}",
                    bundle.annotations.len(),
                    ticket.image_id
                );
                self.bundles.insert(ticket.image_id.clone(), bundle);
                FetchOutcome::Applied
            }
            Err(e) => {
                log::error!("Failed to parse annotations for {}: {}", ticket.image_id, e);
                FetchOutcome::Failed
            }
        }
    }

    /// Cached bundle for an image.
    pub fn get(&self, image_id: &str) -> Option<&AnnotationBundle> {
        self.bundles.get(image_id)
    }

    /// Platform metadata of an image's cached bundle.
    pub fn platform(&self, image_id: &str) -> Option<&PlatformInfo> {
        self.get(image_id).and_then(AnnotationBundle::platform)
    }

    /// Number of cached bundles.
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Check if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Drop all bundles and forget pending fetches. Sequence numbers keep
    /// increasing so tickets issued before the clear stay stale.
    pub fn clear(&mut self) {
        self.bundles.clear();
        self.latest.clear();
        self.pending.clear();
    }
}
