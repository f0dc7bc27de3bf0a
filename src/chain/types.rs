use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assertion::{AssertionResults, ResponseAssertions};
use crate::http::{Method, TransportError};

/// 依赖失败时写入的状态文本
pub const SKIPPED_STATUS_TEXT: &str = "Skipped - Failed Dependencies";

/// 依赖失败时写入的错误信息
pub const SKIPPED_ERROR: &str = "One or more dependencies failed";

/// 请求链中的一个步骤（模板，执行时不会被修改）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRequest {
    /// 步骤 ID，在一条链中唯一
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub method: Method,

    /// URL 模板，可包含 `${var}` 占位符
    pub url: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,

    #[serde(default, rename = "isGraphQL")]
    pub is_graphql: bool,

    #[serde(default, rename = "graphQLQuery", skip_serializing_if = "String::is_empty")]
    pub graphql_query: String,

    #[serde(default, rename = "graphQLVariables", skip_serializing_if = "String::is_empty")]
    pub graphql_variables: String,

    #[serde(default)]
    pub auth: Auth,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertions: Option<ResponseAssertions>,

    /// 提取规则：变量名 → 响应体中的 JSON 路径
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, String>,

    /// 必须先成功的步骤 ID
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ChainRequest {
    pub fn new(id: impl Into<String>, method: Method, url: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_graphql(mut self, query: impl Into<String>, variables: impl Into<String>) -> Self {
        self.is_graphql = true;
        self.graphql_query = query.into();
        self.graphql_variables = variables.into();
        self
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_assertions(mut self, assertions: ResponseAssertions) -> Self {
        self.assertions = Some(assertions);
        self
    }

    /// 添加提取规则
    pub fn extract(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.variables.insert(name.into(), path.into());
        self
    }

    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    /// 用于展示的名称，未设置时退回 ID
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// 认证方式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Auth {
    #[default]
    None,
    Basic {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
    Bearer {
        #[serde(default)]
        token: String,
    },
    ApiKey {
        #[serde(default)]
        key: String,
        #[serde(default)]
        value: String,
        #[serde(default)]
        add_to: ApiKeyLocation,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

/// 传输失败的结构化描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// 服务器返回的错误响应体
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&TransportError> for ErrorDetails {
    fn from(err: &TransportError) -> Self {
        Self {
            message: err.message.clone(),
            code: err.kind.code().to_string(),
            status: err.status,
            details: err.body.clone(),
        }
    }
}

/// 单个步骤的执行结果，每个步骤恰好产生一个
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainResponse {
    pub request_id: String,
    /// 网络层失败和被跳过的步骤为 0
    pub status: u16,
    pub status_text: String,
    pub headers: IndexMap<String, String>,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
    /// 耗时（秒），被跳过的步骤没有
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions: Option<AssertionResults>,
}

impl ChainResponse {
    /// 依赖未满足时的占位结果
    pub fn skipped(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: 0,
            status_text: SKIPPED_STATUS_TEXT.to_string(),
            headers: IndexMap::new(),
            data: Value::Null,
            error: Some(SKIPPED_ERROR.to_string()),
            error_details: None,
            response_time: None,
            assertions: None,
        }
    }

    /// 传输失败的结果：HTTP 错误保留真实状态码，其余为 0
    pub fn from_error(request_id: impl Into<String>, err: &TransportError, elapsed: f64) -> Self {
        Self {
            request_id: request_id.into(),
            status: err.status.unwrap_or(0),
            status_text: err.status_text.clone().unwrap_or_else(|| "Error".to_string()),
            headers: err.headers.clone(),
            data: Value::Null,
            error: Some(err.message.clone()),
            error_details: Some(ErrorDetails::from(err)),
            response_time: Some(elapsed),
            assertions: None,
        }
    }

    /// 依赖判断使用：有错误或状态码 >= 400
    pub fn is_failure(&self) -> bool {
        self.error.is_some() || self.status >= 400
    }

    pub fn is_skipped(&self) -> bool {
        self.status == 0 && self.status_text == SKIPPED_STATUS_TEXT
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn assertions_passed(&self) -> bool {
        self.assertions.as_ref().is_none_or(|a| a.passed)
    }
}

/// 一次执行的统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// 所有已执行步骤的耗时之和（秒）
    pub total_time: f64,
    pub total_assertions: usize,
    pub passed_assertions: usize,
    pub failed_assertions: usize,
}

impl ChainSummary {
    pub fn from_results(results: &[ChainResponse]) -> Self {
        let skipped = results.iter().filter(|r| r.is_skipped()).count();
        let passed = results
            .iter()
            .filter(|r| !r.is_failure() && r.assertions_passed())
            .count();
        let total_time: f64 = results.iter().filter_map(|r| r.response_time).sum();

        let assertions = results.iter().filter_map(|r| r.assertions.as_ref());
        let total_assertions: usize = assertions.clone().map(|a| a.details.total()).sum();
        let passed_assertions: usize = assertions.map(|a| a.details.passed()).sum();

        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed - skipped,
            skipped,
            total_time,
            total_assertions,
            passed_assertions,
            failed_assertions: total_assertions - passed_assertions,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_definition() {
        let def: ChainRequest = serde_json::from_value(json!({
            "id": "login",
            "name": "Login",
            "method": "POST",
            "url": "${base}/login",
            "headers": {"X-Client": "cli"},
            "body": "{\"user\": \"${user}\"}",
            "auth": {"type": "apiKey", "key": "X-Key", "value": "k", "addTo": "query"},
            "variables": {"token": "auth.token"},
            "dependsOn": ["setup"]
        }))
        .unwrap();

        assert_eq!(def.method, Method::Post);
        assert_eq!(def.variables.get("token").map(String::as_str), Some("auth.token"));
        assert_eq!(def.depends_on, vec!["setup"]);
        assert_eq!(
            def.auth,
            Auth::ApiKey {
                key: "X-Key".to_string(),
                value: "k".to_string(),
                add_to: ApiKeyLocation::Query,
            }
        );
    }

    #[test]
    fn test_deserialize_graphql_definition() {
        let def: ChainRequest = serde_json::from_value(json!({
            "id": "q",
            "url": "http://localhost/graphql",
            "isGraphQL": true,
            "graphQLQuery": "{ me { id } }",
            "graphQLVariables": "{}"
        }))
        .unwrap();

        assert!(def.is_graphql);
        assert_eq!(def.method, Method::Get);
        assert_eq!(def.auth, Auth::None);
        assert_eq!(def.display_name(), "q");
    }

    #[test]
    fn test_skipped_response() {
        let response = ChainResponse::skipped("b");
        assert_eq!(response.status, 0);
        assert_eq!(response.status_text, "Skipped - Failed Dependencies");
        assert_eq!(response.error.as_deref(), Some("One or more dependencies failed"));
        assert!(response.is_skipped());
        assert!(response.is_failure());
    }

    #[test]
    fn test_response_from_transport_errors() {
        let err = TransportError::http(404, "Not Found", IndexMap::new(), r#"{"message": "no user"}"#);
        let response = ChainResponse::from_error("a", &err, 0.05);
        assert_eq!(response.status, 404);
        assert_eq!(response.status_text, "Not Found");
        assert_eq!(response.error.as_deref(), Some("no user"));
        let details = response.error_details.unwrap();
        assert_eq!(details.code, "HTTP_ERROR");
        assert_eq!(details.details, Some(json!({"message": "no user"})));

        let response = ChainResponse::from_error("a", &TransportError::timeout(), 30.0);
        assert_eq!(response.status, 0);
        assert_eq!(response.status_text, "Error");
        assert!(!response.is_skipped());
        assert!(response.is_failure());
    }

    #[test]
    fn test_summary_counts() {
        let ok = ChainResponse {
            request_id: "a".to_string(),
            status: 200,
            status_text: "OK".to_string(),
            headers: IndexMap::new(),
            data: Value::Null,
            error: None,
            error_details: None,
            response_time: Some(0.25),
            assertions: None,
        };
        let failed = ChainResponse::from_error("b", &TransportError::network("refused"), 0.5);
        let skipped = ChainResponse::skipped("c");

        let summary = ChainSummary::from_results(&[ok, failed, skipped]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total_time, 0.75);
        assert!(!summary.all_passed());
    }
}
