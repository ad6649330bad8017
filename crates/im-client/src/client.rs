//! Request/session layer.
//!
//! Every call fetches a fresh CSRF token, sends with credentials, and folds
//! every failure into one [`ApiError`]. Tokens are never cached.

use im_api_types::CsrfTokenResponse;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, REJECTED_MESSAGE};
use crate::transport::{Body, HttpRequest, HttpResponse, Method, MultipartForm, Transport};

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_ENDPOINT: &str = "/auth/csrf_token";

/// Caller-supplied parts of a JSON request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    pub fn put() -> Self {
        Self::new(Method::Put)
    }

    pub fn delete() -> Self {
        Self::new(Method::Delete)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let encoded = serde_json::to_string(body)
            .map_err(|err| ApiError::Validation(format!("invalid request body: {err}")))?;
        self.body = Some(encoded);
        Ok(self)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub struct ApiClient<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET the anti-forgery token. Any failure yields `None`; the caller's
    /// request still goes out and the server decides.
    pub async fn csrf_token(&self) -> Option<String> {
        let request = HttpRequest {
            method: Method::Get,
            url: self.config.url(CSRF_ENDPOINT),
            headers: Vec::new(),
            body: Body::Empty,
            timeout: None,
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!("csrf token fetch failed: {err}");
                return None;
            }
        };

        if !response.is_success() {
            warn!("csrf token fetch returned HTTP {}", response.status);
            return None;
        }

        match serde_json::from_str::<CsrfTokenResponse>(&response.body) {
            Ok(body) => Some(body.csrf_token),
            Err(err) => {
                warn!("csrf token body malformed: {err}");
                None
            }
        }
    }

    /// Send a JSON request and decode the success payload.
    pub async fn request<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<R, ApiError> {
        let token = self.csrf_token().await;

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = token {
            headers.push((CSRF_HEADER.to_string(), token));
        }
        merge_headers(&mut headers, options.headers);

        let request = HttpRequest {
            method: options.method,
            url: self.config.url(endpoint),
            headers,
            body: options.body.map_or(Body::Empty, Body::Json),
            timeout: options.timeout,
        };

        self.dispatch(request, "请求失败").await
    }

    /// Send a multipart body. No content type is set so the transport can
    /// write the boundary.
    pub async fn upload_request<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        form: MultipartForm,
    ) -> Result<R, ApiError> {
        let token = self.csrf_token().await;

        let mut headers = Vec::new();
        if let Some(token) = token {
            headers.push((CSRF_HEADER.to_string(), token));
        }

        let request = HttpRequest {
            method,
            url: self.config.url(endpoint),
            headers,
            body: Body::Multipart(form),
            timeout: None,
        };

        self.dispatch(request, "上传失败").await
    }

    async fn dispatch<R: DeserializeOwned>(
        &self,
        request: HttpRequest,
        failure_prefix: &str,
    ) -> Result<R, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        debug!(method = method.as_str(), %url, "api request");

        let response = self.transport.send(request).await.map_err(|err| {
            warn!(method = method.as_str(), %url, "api transport failure: {err}");
            ApiError::from(err)
        })?;

        decode_response(response, failure_prefix).inspect_err(|err| {
            warn!(method = method.as_str(), %url, "api request failed: {err:?}");
        })
    }
}

/// Caller headers replace defaults of the same name (case-insensitive).
fn merge_headers(headers: &mut Vec<(String, String)>, overrides: Vec<(String, String)>) {
    for (name, value) in overrides {
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        headers.push((name, value));
    }
}

fn decode_response<R: DeserializeOwned>(
    response: HttpResponse,
    failure_prefix: &str,
) -> Result<R, ApiError> {
    if !response.is_success() {
        let message = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|body| message_of(&body))
            .unwrap_or_else(|| format!("{failure_prefix}: {}", response.status));
        return Err(ApiError::Status {
            status: response.status,
            message,
        });
    }

    let body: Value = serde_json::from_str(&response.body)
        .map_err(|err| ApiError::Decode(err.to_string()))?;

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Rejected {
            message: message_of(&body).unwrap_or_else(|| REJECTED_MESSAGE.to_string()),
        });
    }

    serde_json::from_value(body).map_err(|err| ApiError::Decode(err.to_string()))
}

fn message_of(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_headers_override_defaults() {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (CSRF_HEADER.to_string(), "t1".to_string()),
        ];
        merge_headers(
            &mut headers,
            vec![("content-type".to_string(), "text/plain".to_string())],
        );
        assert_eq!(headers.len(), 2);
        assert!(headers.contains(&("content-type".to_string(), "text/plain".to_string())));
    }

    #[test]
    fn error_body_message_wins_over_generic_text() {
        let err = decode_response::<Value>(
            HttpResponse { status: 403, body: r#"{"success":false,"message":"无权操作"}"#.into() },
            "请求失败",
        )
        .unwrap_err();
        assert_eq!(err, ApiError::Status { status: 403, message: "无权操作".into() });

        let err = decode_response::<Value>(
            HttpResponse { status: 502, body: "<html>bad gateway</html>".into() },
            "请求失败",
        )
        .unwrap_err();
        assert_eq!(err, ApiError::Status { status: 502, message: "请求失败: 502".into() });
    }

    #[test]
    fn success_false_is_rejected_even_on_2xx() {
        let err = decode_response::<Value>(
            HttpResponse { status: 200, body: r#"{"success":false}"#.into() },
            "请求失败",
        )
        .unwrap_err();
        assert_eq!(err, ApiError::Rejected { message: REJECTED_MESSAGE.into() });
    }
}
