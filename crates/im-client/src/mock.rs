//! Scripted in-memory transport for tests.
//!
//! Replies are keyed by method and API path (the URL after `/api`, without
//! the query string). Each route pops its queued replies in order and keeps
//! answering with the last one. Unscripted routes answer 404.

use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::client::{ApiClient, CSRF_ENDPOINT};
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

pub const MOCK_API_BASE: &str = "http://market.test/api";
pub const MOCK_CSRF_TOKEN: &str = "test-token";

type Reply = Result<HttpResponse, TransportError>;

#[derive(Default)]
pub struct MockTransport {
    routes: RefCell<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
    /// A transport whose CSRF endpoint already answers with [`MOCK_CSRF_TOKEN`].
    pub fn new() -> Self {
        let transport = Self::default();
        transport.reply(
            Method::Get,
            CSRF_ENDPOINT,
            200,
            &format!(r#"{{"csrf_token":"{MOCK_CSRF_TOKEN}"}}"#),
        );
        transport
    }

    pub fn reply(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(
            method,
            path,
            Ok(HttpResponse {
                status,
                body: body.to_string(),
            }),
        );
    }

    pub fn fail(&self, method: Method, path: &str, error: TransportError) {
        self.push(method, path, Err(error));
    }

    /// Drop everything scripted for a route, including the default CSRF reply.
    pub fn clear_route(&self, method: Method, path: &str) {
        self.routes.borrow_mut().remove(&(method, path.to_string()));
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .borrow_mut()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    /// Requests other than CSRF token fetches.
    pub fn api_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| path_of(&r.url) != CSRF_ENDPOINT)
            .cloned()
            .collect()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && path_of(&r.url) == path)
            .cloned()
            .collect()
    }

    pub fn last_request_to(&self, method: Method, path: &str) -> Option<HttpRequest> {
        self.requests_to(method, path).pop()
    }
}

fn path_of(url: &str) -> &str {
    let path = url.strip_prefix(MOCK_API_BASE).unwrap_or(url);
    path.split('?').next().unwrap_or(path)
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = (request.method, path_of(&request.url).to_string());
        self.requests.borrow_mut().push(request);

        let mut routes = self.routes.borrow_mut();
        let Some(queue) = routes.get_mut(&key) else {
            return Ok(HttpResponse {
                status: 404,
                body: r#"{"success":false,"message":"not found"}"#.to_string(),
            });
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(|| Err(TransportError::Timeout))
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Timeout))
        }
    }
}

/// A client pointed at [`MOCK_API_BASE`].
pub fn mock_client<T: Transport>(transport: T) -> ApiClient<T> {
    ApiClient::new(transport, ClientConfig::new(MOCK_API_BASE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestOptions;
    use serde_json::Value;

    #[tokio::test]
    async fn token_failure_still_sends_the_request() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.clear_route(Method::Get, CSRF_ENDPOINT);
        transport.fail(
            Method::Get,
            CSRF_ENDPOINT,
            TransportError::Network("connection refused".into()),
        );
        transport.reply(Method::Get, "/categories", 200, r#"{"success":true,"categories":[]}"#);
        let client = mock_client(&transport);

        let _: Value = client.request("/categories", RequestOptions::get()).await?;
        let sent = transport
            .last_request_to(Method::Get, "/categories")
            .expect("request sent");
        assert_eq!(sent.header(crate::CSRF_HEADER), None);
        Ok(())
    }

    #[tokio::test]
    async fn token_is_fetched_fresh_for_every_request() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Get, "/cart", 200, r#"{"items":[]}"#);
        let client = mock_client(&transport);

        client.cart().await?;
        client.cart().await?;
        assert_eq!(transport.requests_to(Method::Get, CSRF_ENDPOINT).len(), 2);
        let sent = transport.last_request_to(Method::Get, "/cart").expect("cart fetched");
        assert_eq!(sent.header(crate::CSRF_HEADER), Some(MOCK_CSRF_TOKEN));
        assert_eq!(sent.header("content-type"), Some("application/json"));
        Ok(())
    }

    #[tokio::test]
    async fn transport_errors_map_to_user_messages() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.fail(Method::Post, "/auth/login", TransportError::Timeout);
        transport.fail(
            Method::Get,
            "/categories",
            TransportError::Network("dns".into()),
        );
        let client = mock_client(&transport);

        let login = im_api_types::LoginRequest {
            username: "zhang".into(),
            password: "secret1".into(),
            remember: false,
        };
        let err = client.login(&login).await.unwrap_err();
        assert_eq!(err.user_message(), "请求超时，请检查网络连接");

        let err = client.categories().await.unwrap_err();
        assert_eq!(err.user_message(), "网络错误，请稍后重试");
        Ok(())
    }

    #[tokio::test]
    async fn uploads_leave_content_type_to_the_transport() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Post, "/instruments", 200, r#"{"success":true,"instrument_id":9}"#);
        let client = mock_client(&transport);

        let form = crate::MultipartForm::new().text("title", "雅马哈 F310");
        let published = client.publish_instrument(form).await?;
        assert_eq!(published.instrument_id, Some(im_api_types::InstrumentId(9)));

        let sent = transport.last_request_to(Method::Post, "/instruments").expect("upload sent");
        assert_eq!(sent.header("content-type"), None);
        assert_eq!(sent.header(crate::CSRF_HEADER), Some(MOCK_CSRF_TOKEN));
        Ok(())
    }
}
