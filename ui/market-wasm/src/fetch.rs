//! `fetch`-backed transport.
//!
//! Every request is credentialed so the session cookie travels with it.
//! A deadline arms an `AbortController`; an aborted request reports
//! [`TransportError::Timeout`].

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder};
use gloo_timers::callback::Timeout;
use im_client::{Body, HttpRequest, HttpResponse, Method, MultipartForm, Transport, TransportError};
use js_sys::{Array, Uint8Array};
use tracing::debug;
use wasm_bindgen::JsValue;
use web_sys::{AbortController, AbortSignal, Blob, BlobPropertyBag, FormData, RequestCredentials};

#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

fn builder(method: Method, url: &str) -> RequestBuilder {
    match method {
        Method::Get => Request::get(url),
        Method::Post => Request::post(url),
        Method::Put => Request::put(url),
        Method::Delete => Request::delete(url),
    }
}

fn network(err: impl std::fmt::Display) -> TransportError {
    TransportError::Network(err.to_string())
}

fn js_network(value: JsValue) -> TransportError {
    TransportError::Network(format!("{value:?}"))
}

/// Scalar fields, then files as blobs. No content type is set on the
/// request so the browser writes the boundary.
fn form_data(form: &MultipartForm) -> Result<FormData, JsValue> {
    let data = FormData::new()?;
    for (name, value) in &form.fields {
        data.append_with_str(name, value)?;
    }
    for (name, file) in &form.files {
        let bytes = Uint8Array::from(file.bytes.as_slice());
        let options = BlobPropertyBag::new();
        options.set_type(&file.content_type);
        let blob = Blob::new_with_u8_array_sequence_and_options(&Array::of1(&bytes), &options)?;
        data.append_with_blob_and_filename(name, &blob, &file.file_name)?;
    }
    Ok(data)
}

fn failure(signal: &AbortSignal, err: gloo_net::Error) -> TransportError {
    if signal.aborted() {
        TransportError::Timeout
    } else {
        network(err)
    }
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let controller = AbortController::new().map_err(js_network)?;
        let signal = controller.signal();

        let mut pending = builder(request.method, &request.url)
            .credentials(RequestCredentials::Include)
            .abort_signal(Some(&signal));
        for (name, value) in &request.headers {
            pending = pending.header(name, value);
        }
        let prepared = match &request.body {
            Body::Empty => pending.build(),
            Body::Json(json) => pending.body(json.as_str()),
            Body::Multipart(form) => pending.body(form_data(form).map_err(js_network)?),
        }
        .map_err(network)?;

        // Dropping the handle cancels the timer.
        let _deadline = request.timeout.map(|limit| {
            let millis = u32::try_from(limit.as_millis()).unwrap_or(u32::MAX);
            Timeout::new(millis, move || controller.abort())
        });

        let response = prepared.send().await.map_err(|err| failure(&signal, err))?;
        let status = response.status();
        let body = response.text().await.map_err(|err| failure(&signal, err))?;
        debug!(method = request.method.as_str(), url = %request.url, status, "fetch");

        Ok(HttpResponse { status, body })
    }
}
