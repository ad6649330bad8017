use thiserror::Error;

/// Shown for transport failures: connection refused, DNS, CORS, aborted body.
pub const NETWORK_MESSAGE: &str = "网络错误，请稍后重试";
/// Shown when a request with a deadline is aborted.
pub const TIMEOUT_MESSAGE: &str = "请求超时，请检查网络连接";
/// Shown for `success: false` bodies that carry no message.
pub const REJECTED_MESSAGE: &str = "操作失败";

/// Failure reported by a [`Transport`](crate::Transport) before any HTTP
/// status is available.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("request deadline elapsed")]
    Timeout,
}

/// Every failure an API call can end in.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{}", NETWORK_MESSAGE)]
    Network(String),
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,
    /// Non-2xx response. `message` is the body's `message` field or a
    /// generic `<operation>失败: <status>` string.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// 2xx response whose body said `success: false`.
    #[error("{message}")]
    Rejected { message: String },
    /// 2xx response that did not decode into the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
    /// Input refused locally; nothing was sent.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// The one string a call site shows the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) | ApiError::Decode(_) => NETWORK_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the failure means the session is missing.
    ///
    /// Protected endpoints answer 401, or redirect to the HTML login page,
    /// which surfaces here as an undecodable body.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ApiError::Status { status: 401, .. } | ApiError::Decode(_)
        )
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(detail) => ApiError::Network(detail),
            TransportError::Timeout => ApiError::Timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_network_are_reported_distinctly() {
        assert_eq!(ApiError::Timeout.user_message(), TIMEOUT_MESSAGE);
        assert_eq!(
            ApiError::from(TransportError::Network("refused".into())).user_message(),
            NETWORK_MESSAGE
        );
        assert!(ApiError::Timeout.is_transient());
    }

    #[test]
    fn status_and_rejection_surface_server_text() {
        let err = ApiError::Status { status: 400, message: "价格必须大于0".into() };
        assert_eq!(err.user_message(), "价格必须大于0");
        let err = ApiError::Rejected { message: "out of stock".into() };
        assert_eq!(err.user_message(), "out of stock");
        assert!(!err.requires_login());
        assert!(ApiError::Status { status: 401, message: String::new() }.requires_login());
    }
}
