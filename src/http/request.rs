use indexmap::IndexMap;

use crate::http::types::Method;

/// 已完成变量替换、可以直接发送的请求
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// 包含查询参数的完整 URL
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub body: Option<String>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: IndexMap::new(),
            body: None,
        }
    }

    /// 设置 header，名称大小写不敏感，已存在的同名 header 会被替换
    pub fn set_header(&mut self, key: &str, value: impl Into<String>) {
        let existing = self
            .headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case(key))
            .cloned();
        if let Some(existing) = existing {
            self.headers.shift_remove(&existing);
        }
        self.headers.insert(key.to_string(), value.into());
    }

    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_header(key, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let request = Request::new(Method::Get, "http://localhost/")
            .with_header("Content-Type", "application/json")
            .with_header("content-type", "text/plain");

        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn test_header_missing() {
        let request = Request::new(Method::Get, "http://localhost/");
        assert_eq!(request.header("Authorization"), None);
    }
}
