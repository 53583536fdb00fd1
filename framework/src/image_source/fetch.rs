use js_sys::Uint8Array;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::{FetchError, ImageSource};

/// Downloads images relative to the current page with the `fetch` API.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchImageSource;

impl ImageSource for FetchImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let window = web_sys::window().ok_or_else(|| FetchError::new(url, "no window"))?;
        let response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|error| FetchError::new(url, format!("{error:?}")))?
            .dyn_into::<Response>()
            .map_err(|_| FetchError::new(url, "unexpected response type"))?;
        if !response.ok() {
            return Err(FetchError::new(url, format!("HTTP {}", response.status())));
        }

        let body = response
            .array_buffer()
            .map_err(|error| FetchError::new(url, format!("{error:?}")))?;
        let body = JsFuture::from(body)
            .await
            .map_err(|error| FetchError::new(url, format!("{error:?}")))?;
        let bytes = Uint8Array::new(&body).to_vec();
        debug!("fetched {} bytes from {url}", bytes.len());
        Ok(bytes)
    }
}
