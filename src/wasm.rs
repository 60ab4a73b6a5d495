//! Browser front-end.
//!
//! Runs the egui viewer on a canvas. Fetches go through the Fetch API; each
//! bundle request carries its own `AbortController` so a superseded request
//! is cancelled in the network layer too.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{AbortController, HtmlCanvasElement};

use crate::cache::FetchTicket;
use crate::config::ViewerConfig;
use crate::error::FetchError;
use crate::message::Message;
use crate::session::{Backend, Session};
use crate::source::HttpSource;
use crate::ui::ViewerApp;

const CANVAS_ID: &str = "viewer";

/// Fetch API backend; completions land in a shared inbox polled each frame.
#[derive(Default)]
pub struct WebBackend {
    /// Finished requests not yet handed to the dashboard
    inbox: Rc<RefCell<VecDeque<Message>>>,
    /// Requests started but not yet finished
    in_flight: Rc<Cell<usize>>,
    /// Controllers of in-flight bundle requests keyed by ticket sequence number
    controllers: Rc<RefCell<HashMap<u64, AbortController>>>,
}

impl WebBackend {
    fn spawn_fetch(
        &self,
        path: String,
        controller: Option<AbortController>,
        wrap: impl FnOnce(Result<String, FetchError>) -> Message + 'static,
    ) {
        let inbox = Rc::clone(&self.inbox);
        let in_flight = Rc::clone(&self.in_flight);
        in_flight.set(in_flight.get() + 1);

        spawn_local(async move {
            let signal = controller.as_ref().map(AbortController::signal);
            let result = HttpSource::fetch_with_signal(&path, signal.as_ref()).await;
            in_flight.set(in_flight.get().saturating_sub(1));
            inbox.borrow_mut().push_back(wrap(result));
        });
    }
}

impl Backend for WebBackend {
    fn fetch_manifest(&mut self, path: String) {
        self.spawn_fetch(path, None, Message::ManifestFetched);
    }

    fn fetch_references(&mut self, path: String) {
        self.spawn_fetch(path, None, Message::ReferencesFetched);
    }

    fn fetch_bundle(&mut self, ticket: FetchTicket, path: String) {
        let controller = match AbortController::new() {
            Ok(controller) => {
                self.controllers
                    .borrow_mut()
                    .insert(ticket.seq, controller.clone());
                Some(controller)
            }
            Err(e) => {
                log::warn!("AbortController unavailable: {:?}", e);
                None
            }
        };

        let controllers = Rc::clone(&self.controllers);
        self.spawn_fetch(path, controller, move |result| {
            controllers.borrow_mut().remove(&ticket.seq);
            Message::BundleFetched { ticket, result }
        });
    }

    fn abort(&mut self, ticket: &FetchTicket) {
        if let Some(controller) = self.controllers.borrow_mut().remove(&ticket.seq) {
            log::debug!("Aborting bundle request #{}", ticket.seq);
            controller.abort();
        }
    }

    fn poll(&mut self) -> Option<Message> {
        self.inbox.borrow_mut().pop_front()
    }

    fn pending_count(&self) -> usize {
        self.in_flight.get() + self.inbox.borrow().len()
    }

    /// Image loaders need absolute URLs; relative paths resolve against the page.
    fn asset_uri(&self, path: &str) -> String {
        let base = web_sys::window().and_then(|w| w.location().href().ok());
        match base.map(|base| web_sys::Url::new_with_base(path, &base)) {
            Some(Ok(url)) => url.href(),
            _ => path.to_string(),
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    // The configured level is applied once the config is read
    if let Err(e) = console_log::init_with_level(log::Level::Trace) {
        web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
    }

    let mut config = ViewerConfig::load_from_local_storage().unwrap_or_default();
    log::set_max_level(config.log_level);

    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CANVAS_ID))
        .ok_or_else(|| JsValue::from_str("No viewer canvas"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("#viewer is not a canvas"))?;
    if let Some(base) = canvas.get_attribute("data-base") {
        config.paths.base_path = base;
    }
    log::info!(
        "Annotation viewer starting (data at '{}')",
        config.paths.base_path
    );

    let session = Session::new(config, WebBackend::default());
    spawn_local(async move {
        let result = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, session)))),
            )
            .await;
        if let Err(e) = result {
            log::error!("Failed to start viewer: {:?}", e);
        }
    });

    Ok(())
}
