//! HTTP asset source using the browser Fetch API (WASM only).

use std::future::Future;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortSignal, RequestInit, Response};

use super::AssetSource;
use crate::error::FetchError;

/// Fetches assets relative to the page URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpSource;

impl HttpSource {
    /// Fetch a text file, optionally bound to an abort signal.
    pub async fn fetch_with_signal(
        path: &str,
        signal: Option<&AbortSignal>,
    ) -> Result<String, FetchError> {
        let window =
            web_sys::window().ok_or_else(|| FetchError::Network("No window object".to_string()))?;
        let start = web_time::Instant::now();

        let init = RequestInit::new();
        init.set_method("GET");
        if let Some(signal) = signal {
            init.set_signal(Some(signal));
        }

        let value = JsFuture::from(window.fetch_with_str_and_init(path, &init))
            .await
            .map_err(js_fetch_error)?;
        let response: Response = value
            .dyn_into()
            .map_err(|_| FetchError::Network("fetch did not return a Response".to_string()))?;

        if !response.ok() {
            let status = response.status();
            return Err(if status == 404 {
                FetchError::not_found(path)
            } else {
                FetchError::http(status, path)
            });
        }

        let text = JsFuture::from(response.text().map_err(js_fetch_error)?)
            .await
            .map_err(js_fetch_error)?;

        log::debug!(
            "Fetched {} in {:.1} ms",
            path,
            start.elapsed().as_secs_f64() * 1000.0
        );

        text.as_string()
            .ok_or_else(|| FetchError::Network(format!("{}: body is not text", path)))
    }
}

/// Map a rejected fetch promise to a fetch error.
fn js_fetch_error(value: JsValue) -> FetchError {
    let name = js_sys::Reflect::get(&value, &"name".into())
        .ok()
        .and_then(|n| n.as_string());
    if name.as_deref() == Some("AbortError") {
        return FetchError::Aborted;
    }
    FetchError::Network(format!("{:?}", value))
}

impl AssetSource for HttpSource {
    fn fetch_text(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> {
        let path = path.to_string();
        async move { Self::fetch_with_signal(&path, None).await }
    }
}
