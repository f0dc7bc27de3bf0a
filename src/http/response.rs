use indexmap::IndexMap;
use serde_json::Value;

/// 传输层返回的原始响应
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    /// header 名称统一为小写
    pub headers: IndexMap<String, String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_string(),
            headers: IndexMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.insert(key.to_ascii_lowercase(), value.into());
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(|s| s.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// 按 Content-Type 解析响应体
    pub fn data(&self) -> Value {
        parse_body(self.content_type(), &self.body)
    }
}

/// 按声明的内容类型尽力解析响应体
///
/// - 空响应体 → `null`
/// - Content-Type 含 `json` → JSON（解析失败退回文本）
/// - 其他 → 文本
pub fn parse_body(content_type: Option<&str>, body: &str) -> Value {
    if body.is_empty() {
        return Value::Null;
    }

    let is_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);

    if is_json {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            return value;
        }
        tracing::debug!("Response declared JSON but failed to parse, keeping text");
    }

    Value::String(body.to_string())
}

pub fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}
