//! Background thread for asset fetching (native only).
//!
//! Carries out the dashboard's fetch commands against a [`FsSource`] off the
//! UI thread and hands the results back as [`Message`]s. Aborted bundle
//! tickets are skipped before the file is read and reported as
//! [`FetchError::Aborted`] so the cache can retire them.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, RecvError, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::cache::FetchTicket;
use crate::error::FetchError;
use crate::message::Message;
use crate::session::{Backend, BlockingBackend};
use crate::source::FsSource;

/// What a queued read is for.
#[derive(Debug, Clone)]
enum FetchKind {
    Manifest,
    References,
    Bundle(FetchTicket),
}

/// Message sent to the fetch thread.
enum ThreadMessage {
    /// Read a file
    Fetch { kind: FetchKind, path: String },
    /// Shutdown the thread
    Shutdown,
}

/// Manages a background thread that reads viewer assets.
pub struct FetchThread {
    /// Sender for requests to the background thread
    request_tx: Sender<ThreadMessage>,
    /// Receiver for results from the background thread
    result_rx: Receiver<Message>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
    /// Sequence numbers of aborted bundle fetches
    cancelled: Arc<Mutex<HashSet<u64>>>,
    /// Requests sent but not yet answered
    pending: usize,
    /// Same root the thread reads from, for asset URIs
    source: FsSource,
}

impl FetchThread {
    /// Spawn a new fetch thread reading from `source`.
    pub fn spawn(source: FsSource) -> Result<Self, String> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<Message>();
        let cancelled = Arc::new(Mutex::new(HashSet::new()));
        let thread_cancelled = Arc::clone(&cancelled);
        let thread_source = source.clone();

        let thread_handle = thread::Builder::new()
            .name("asset-fetch".to_string())
            .spawn(move || {
                log::debug!("Fetch thread started");
                Self::thread_loop(&thread_source, request_rx, result_tx, &thread_cancelled);
                log::debug!("Fetch thread exiting");
            })
            .map_err(|e| format!("Failed to spawn fetch thread: {}", e))?;

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            cancelled,
            pending: 0,
            source,
        })
    }

    /// Background thread main loop.
    fn thread_loop(
        source: &FsSource,
        request_rx: Receiver<ThreadMessage>,
        result_tx: Sender<Message>,
        cancelled: &Mutex<HashSet<u64>>,
    ) {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Fetch { kind, path }) => {
                    let message = match kind {
                        FetchKind::Manifest => Message::ManifestFetched(source.read_text(&path)),
                        FetchKind::References => {
                            Message::ReferencesFetched(source.read_text(&path))
                        }
                        FetchKind::Bundle(ticket) => {
                            let aborted = cancelled
                                .lock()
                                .map(|mut set| set.remove(&ticket.seq))
                                .unwrap_or(false);
                            let result = if aborted {
                                Err(FetchError::Aborted)
                            } else {
                                source.read_text(&path)
                            };
                            Message::BundleFetched { ticket, result }
                        }
                    };
                    if result_tx.send(message).is_err() {
                        log::warn!("Result channel closed, fetch thread exiting");
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(_) => {
                    log::debug!("Request channel closed, fetch thread exiting");
                    break;
                }
            }
        }
    }

    fn send(&mut self, kind: FetchKind, path: String) {
        if self
            .request_tx
            .send(ThreadMessage::Fetch { kind, path })
            .is_err()
        {
            log::error!("Failed to send fetch request: channel closed");
        } else {
            self.pending += 1;
        }
    }
}

impl Backend for FetchThread {
    fn fetch_manifest(&mut self, path: String) {
        self.send(FetchKind::Manifest, path);
    }

    fn fetch_references(&mut self, path: String) {
        self.send(FetchKind::References, path);
    }

    fn fetch_bundle(&mut self, ticket: FetchTicket, path: String) {
        self.send(FetchKind::Bundle(ticket), path);
    }

    /// Mark a bundle read as aborted. Reads the thread has not started yet
    /// are skipped.
    fn abort(&mut self, ticket: &FetchTicket) {
        if let Ok(mut set) = self.cancelled.lock() {
            set.insert(ticket.seq);
        }
    }

    fn poll(&mut self) -> Option<Message> {
        match self.result_rx.try_recv() {
            Ok(message) => {
                self.pending = self.pending.saturating_sub(1);
                Some(message)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Fetch thread disconnected");
                self.pending = 0;
                None
            }
        }
    }

    fn pending_count(&self) -> usize {
        self.pending
    }

    fn asset_uri(&self, path: &str) -> String {
        format!("file://{}", self.source.resolve(path).display())
    }
}

impl BlockingBackend for FetchThread {
    fn recv(&mut self) -> Option<Message> {
        if self.pending == 0 {
            return None;
        }
        match self.result_rx.recv() {
            Ok(message) => {
                self.pending -= 1;
                Some(message)
            }
            Err(RecvError) => {
                log::warn!("Fetch thread disconnected");
                self.pending = 0;
                None
            }
        }
    }
}

impl Drop for FetchThread {
    fn drop(&mut self) {
        log::debug!("Shutting down fetch thread");

        let _ = self.request_tx.send(ThreadMessage::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Fetch thread panicked: {:?}", e);
            }
        }
    }
}
