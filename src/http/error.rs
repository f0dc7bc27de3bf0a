use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 传输失败的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportErrorKind {
    /// 请求超时
    Timeout,
    /// 连接失败等网络错误
    Network,
    /// 服务器返回 4xx/5xx
    Http,
    /// GraphQL variables 不是合法 JSON
    GraphQl,
    /// URL 无法解析
    Url,
    /// 请求无法构造，例如非法的请求头
    Request,
}

impl TransportErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::Network => "NETWORK_ERROR",
            Self::Http => "HTTP_ERROR",
            Self::GraphQl => "GRAPHQL_ERROR",
            Self::Url => "URL_ERROR",
            Self::Request => "REQUEST_ERROR",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub headers: IndexMap<String, String>,
    /// 服务器返回的错误响应体（能解析为 JSON 时为 JSON）
    pub body: Option<Value>,
}

impl TransportError {
    fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            status_text: None,
            headers: IndexMap::new(),
            body: None,
        }
    }

    pub fn timeout() -> Self {
        Self::new(TransportErrorKind::Timeout, "Request timed out")
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn graphql(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::GraphQl, message)
    }

    pub fn url(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Url, message)
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Request, message)
    }

    /// 构造 HTTP 错误，消息优先取自错误响应体的 `message` / `error` 字段
    pub fn http(
        status: u16,
        status_text: impl Into<String>,
        headers: IndexMap<String, String>,
        body: &str,
    ) -> Self {
        let parsed = serde_json::from_str::<Value>(body).ok();
        let message = parsed
            .as_ref()
            .and_then(server_message)
            .or_else(|| (!body.trim().is_empty()).then(|| body.to_string()))
            .unwrap_or_else(|| format!("HTTP error! status: {}", status));

        Self {
            kind: TransportErrorKind::Http,
            message,
            status: Some(status),
            status_text: Some(status_text.into()),
            headers,
            body: parsed.or_else(|| (!body.is_empty()).then(|| Value::String(body.to_string()))),
        }
    }

    /// 4xx 视为客户端错误，不重试；超时和构造阶段的错误同样不重试
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            TransportErrorKind::Network => true,
            TransportErrorKind::Http => !matches!(self.status, Some(400..=499)),
            TransportErrorKind::Timeout
            | TransportErrorKind::GraphQl
            | TransportErrorKind::Url
            | TransportErrorKind::Request => false,
        }
    }
}

fn server_message(body: &Value) -> Option<String> {
    ["message", "error"].iter().find_map(|key| match body.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::timeout()
        } else if err.is_builder() {
            TransportError::request(format!("Failed to build request: {}", err))
        } else {
            TransportError::network(format!(
                "Network error: Unable to connect to the server ({})",
                err
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_error_uses_server_message() {
        let err = TransportError::http(
            422,
            "Unprocessable Entity",
            IndexMap::new(),
            r#"{"message": "email is taken"}"#,
        );
        assert_eq!(err.message, "email is taken");
        assert_eq!(err.status, Some(422));
        assert_eq!(err.body, Some(json!({"message": "email is taken"})));
    }

    #[test]
    fn test_http_error_uses_error_field() {
        let err = TransportError::http(500, "Internal Server Error", IndexMap::new(), r#"{"error": "boom"}"#);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_http_error_falls_back_to_text_then_default() {
        let err = TransportError::http(502, "Bad Gateway", IndexMap::new(), "upstream down");
        assert_eq!(err.message, "upstream down");

        let err = TransportError::http(503, "Service Unavailable", IndexMap::new(), "");
        assert_eq!(err.message, "HTTP error! status: 503");
        assert_eq!(err.body, None);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(TransportError::network("refused").is_retryable());
        assert!(TransportError::http(500, "", IndexMap::new(), "").is_retryable());
        assert!(!TransportError::http(404, "", IndexMap::new(), "").is_retryable());
        assert!(!TransportError::timeout().is_retryable());
        assert!(!TransportError::url("bad").is_retryable());
        assert!(!TransportError::request("bad header").is_retryable());
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(TransportError::timeout().kind.code(), "TIMEOUT");
        assert_eq!(TransportError::network("x").kind.code(), "NETWORK_ERROR");
        assert_eq!(TransportError::graphql("x").kind.code(), "GRAPHQL_ERROR");
        assert_eq!(TransportError::url("x").to_string(), "URL_ERROR: x");
        assert_eq!(TransportError::request("x").kind.code(), "REQUEST_ERROR");
    }
}
