//! A dashboard paired with the backend that performs its fetches.
//!
//! [`Session`] never blocks: commands go to the backend as they are issued
//! and results are pulled with [`Session::pump`], once per frame in the GUI.
//! An abort therefore reaches the backend while the superseded read may
//! still be queued, and a result that lands afterwards is dropped by the
//! cache's ticket check.

use crate::app::Dashboard;
use crate::cache::FetchTicket;
use crate::config::ViewerConfig;
use crate::message::{Command, Message};

/// Performs fetches on behalf of a [`Session`].
pub trait Backend {
    /// Start reading the manifest.
    fn fetch_manifest(&mut self, path: String);
    /// Start reading the human reference file.
    fn fetch_references(&mut self, path: String);
    /// Start reading an annotation bundle.
    fn fetch_bundle(&mut self, ticket: FetchTicket, path: String);
    /// Cancel a bundle read if it has not finished.
    fn abort(&mut self, ticket: &FetchTicket);
    /// Take one finished result without blocking.
    fn poll(&mut self) -> Option<Message>;
    /// Number of requests not yet answered.
    fn pending_count(&self) -> usize;
    /// URI an image loader can open for an asset path.
    fn asset_uri(&self, path: &str) -> String;
}

/// A backend that can also wait for its next result.
pub trait BlockingBackend: Backend {
    /// Block until a result arrives. None once nothing is pending.
    fn recv(&mut self) -> Option<Message>;
}

/// Viewer state plus the backend serving it.
pub struct Session<B: Backend> {
    dashboard: Dashboard,
    backend: B,
    /// Copy payload produced by the last dispatched message
    clipboard: Option<String>,
}

impl<B: Backend> Session<B> {
    /// Create a dashboard and start loading the manifest.
    pub fn new(config: ViewerConfig, backend: B) -> Self {
        let (dashboard, commands) = Dashboard::new(config);
        let mut session = Self {
            dashboard,
            backend,
            clipboard: None,
        };
        session.execute(commands);
        session
    }

    /// Dashboard state.
    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply a message and hand its fetches to the backend.
    ///
    /// Returns the text to put on the clipboard when the message was a copy.
    pub fn dispatch(&mut self, message: Message) -> Option<String> {
        self.clipboard = None;
        let commands = self.dashboard.update(message);
        self.execute(commands);
        self.clipboard.take()
    }

    /// Apply every result the backend has ready. Returns how many there were.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(message) = self.backend.poll() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    /// Whether requests are still outstanding.
    pub fn is_busy(&self) -> bool {
        self.backend.pending_count() > 0
    }

    /// Activate the image with the given id. Returns false if it is unknown.
    pub fn show_image(&mut self, id: &str) -> bool {
        let Some(index) = self.dashboard.images().iter().position(|r| r.id == id) else {
            return false;
        };
        if self.dashboard.active_index() != Some(index) {
            self.dispatch(Message::JumpTo(index));
        }
        true
    }

    /// URI of an asset for the image loaders.
    pub fn asset_uri(&self, path: &str) -> String {
        self.backend.asset_uri(path)
    }

    fn apply(&mut self, message: Message) {
        let commands = self.dashboard.update(message);
        self.execute(commands);
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::FetchManifest { path } => self.backend.fetch_manifest(path),
                Command::FetchReferences { path } => self.backend.fetch_references(path),
                Command::FetchBundle { ticket, path } => self.backend.fetch_bundle(ticket, path),
                Command::AbortFetch(ticket) => self.backend.abort(&ticket),
                Command::CopyToClipboard(text) => self.clipboard = Some(text),
            }
        }
    }
}

impl<B: BlockingBackend> Session<B> {
    /// Feed results back until nothing is pending.
    pub fn wait_idle(&mut self) {
        while let Some(message) = self.backend.recv() {
            self.apply(message);
        }
    }
}
