use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::chain::types::{ApiKeyLocation, Auth, ChainRequest};
use crate::http::{Request, TransportError};
use crate::variable::{DataVariable, RuntimeVariables, VariableResolver};

const DEFAULT_ACCEPT: &str = "application/json";
const DEFAULT_CONTENT_TYPE: &str = "application/json";
/// GraphQL 请求体仍是 JSON 信封，因此只替换 Accept，Content-Type 保持 application/json
const GRAPHQL_ACCEPT: &str = "application/graphql-response+json, application/json";

/// 把步骤模板展开为可发送的请求
///
/// 只有 URL 无法解析时才失败，其余问题（未解析的占位符、非法 JSON 请求体、
/// 非法 GraphQL variables）都按原样或省略处理。
pub fn materialize(
    def: &ChainRequest,
    runtime: &RuntimeVariables,
    repository: &[DataVariable],
) -> Result<Request, TransportError> {
    Materializer::new(runtime, repository).materialize(def)
}

pub struct Materializer<'a> {
    runtime: &'a RuntimeVariables,
    repository: &'a [DataVariable],
    base_url: Option<&'a Url>,
}

impl<'a> Materializer<'a> {
    pub fn new(runtime: &'a RuntimeVariables, repository: &'a [DataVariable]) -> Self {
        Self {
            runtime,
            repository,
            base_url: None,
        }
    }

    /// 相对 URL 以此为基础解析
    pub fn with_base_url(mut self, base_url: Option<&'a Url>) -> Self {
        self.base_url = base_url;
        self
    }

    fn resolve(&self, text: &str) -> String {
        VariableResolver::resolve(text, self.runtime, self.repository)
    }

    pub fn materialize(&self, def: &ChainRequest) -> Result<Request, TransportError> {
        let mut url = self.build_url(def)?;
        let mut request = Request::new(def.method, String::new());

        request.set_header("Accept", DEFAULT_ACCEPT);
        request.set_header("Content-Type", DEFAULT_CONTENT_TYPE);
        if def.is_graphql {
            request.set_header("Accept", GRAPHQL_ACCEPT);
        }

        for (key, value) in &def.headers {
            request.set_header(key, self.resolve(value));
        }

        if def.method.allows_body() {
            request.body = if def.is_graphql {
                Some(self.graphql_body(def))
            } else {
                prepare_body(&self.resolve(&def.body))
            };
        }

        self.apply_auth(&def.auth, &mut request, &mut url);

        request.url = url.to_string();
        Ok(request)
    }

    fn build_url(&self, def: &ChainRequest) -> Result<Url, TransportError> {
        let resolved = self.resolve(&def.url);
        let mut url = parse_url(&resolved, self.base_url)?;

        let params: Vec<(&str, String)> = def
            .params
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| (key.as_str(), self.resolve(value)))
            .collect();

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    fn graphql_body(&self, def: &ChainRequest) -> String {
        let mut envelope = Map::new();
        envelope.insert(
            "query".to_string(),
            Value::String(self.resolve(&def.graphql_query)),
        );

        match parse_graphql_variables(&self.resolve(&def.graphql_variables)) {
            Ok(Some(variables)) => {
                envelope.insert("variables".to_string(), variables);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(request = %def.id, error = %err, "Dropping GraphQL variables");
            }
        }

        Value::Object(envelope).to_string()
    }

    fn apply_auth(&self, auth: &Auth, request: &mut Request, url: &mut Url) {
        match auth {
            Auth::None => {}
            Auth::Basic { username, password } => {
                let username = self.resolve(username);
                if username.is_empty() {
                    debug!("Basic auth without username, skipping");
                    return;
                }
                let credentials = format!("{}:{}", username, self.resolve(password));
                request.set_header(
                    "Authorization",
                    format!("Basic {}", STANDARD.encode(credentials)),
                );
            }
            Auth::Bearer { token } => {
                let token = self.resolve(token);
                if token.is_empty() {
                    debug!("Bearer auth without token, skipping");
                    return;
                }
                request.set_header("Authorization", format!("Bearer {}", token));
            }
            Auth::ApiKey { key, value, add_to } => {
                let key = self.resolve(key);
                let value = self.resolve(value);
                if key.is_empty() || value.is_empty() {
                    debug!("API key auth incomplete, skipping");
                    return;
                }
                match add_to {
                    ApiKeyLocation::Header => request.set_header(&key, value),
                    ApiKeyLocation::Query => {
                        url.query_pairs_mut().append_pair(&key, &value);
                    }
                }
            }
        }
    }
}

fn parse_url(raw: &str, base_url: Option<&Url>) -> Result<Url, TransportError> {
    match (Url::parse(raw), base_url) {
        (Ok(url), _) => Ok(url),
        (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => base
            .join(raw)
            .map_err(|e| TransportError::url(format!("Invalid URL: {} ({})", raw, e))),
        (Err(e), _) => Err(TransportError::url(format!("Invalid URL: {} ({})", raw, e))),
    }
}

/// 解析 GraphQL variables，空字符串表示没有变量
pub fn parse_graphql_variables(raw: &str) -> Result<Option<Value>, TransportError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|e| TransportError::graphql(format!("Invalid GraphQL variables format: {}", e)))
}

/// 合法 JSON 重新序列化，其他文本原样发送，空白请求体不发送
fn prepare_body(resolved: &str) -> Option<String> {
    if resolved.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(resolved) {
        Ok(value) => Some(value.to_string()),
        Err(_) => {
            debug!("Request body is not JSON, sending verbatim");
            Some(resolved.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::variable::DataKind;
    use serde_json::json;

    fn runtime(pairs: &[(&str, Value)]) -> RuntimeVariables {
        let mut vars = RuntimeVariables::new();
        for (k, v) in pairs {
            vars.insert(*k, v.clone());
        }
        vars
    }

    #[test]
    fn test_url_placeholder_resolved() {
        let def = ChainRequest::new("a", Method::Get, "https://x/${id}");
        let request = materialize(&def, &runtime(&[("id", json!("42"))]), &[]).unwrap();
        assert_eq!(request.url, "https://x/42");
    }

    #[test]
    fn test_unresolved_body_kept_literal() {
        let def = ChainRequest::new("a", Method::Post, "https://x/users")
            .with_body(r#"{"email":"${email}"}"#);
        let request = materialize(&def, &RuntimeVariables::new(), &[]).unwrap();
        assert_eq!(request.body.as_deref(), Some(r#"{"email":"${email}"}"#));
    }

    #[test]
    fn test_json_body_canonicalized() {
        let def = ChainRequest::new("a", Method::Post, "https://x/users")
            .with_body("{\n  \"name\": \"${name}\",\n  \"age\": 3\n}");
        let request = materialize(&def, &runtime(&[("name", json!("Ann"))]), &[]).unwrap();
        assert_eq!(request.body.as_deref(), Some(r#"{"name":"Ann","age":3}"#));
    }

    #[test]
    fn test_non_json_body_passed_through() {
        let def = ChainRequest::new("a", Method::Put, "https://x/").with_body("a=1&b=2");
        let request = materialize(&def, &RuntimeVariables::new(), &[]).unwrap();
        assert_eq!(request.body.as_deref(), Some("a=1&b=2"));
    }

    #[test]
    fn test_get_never_has_body() {
        let def = ChainRequest::new("a", Method::Get, "https://x/").with_body(r#"{"a":1}"#);
        let request = materialize(&def, &RuntimeVariables::new(), &[]).unwrap();
        assert_eq!(request.body, None);

        let def = ChainRequest::new("a", Method::Post, "https://x/").with_body("   ");
        let request = materialize(&def, &RuntimeVariables::new(), &[]).unwrap();
        assert_eq!(request.body, None);
    }

    #[test]
    fn test_params_appended_including_empty_values() {
        let def = ChainRequest::new("a", Method::Get, "https://x/search?page=1")
            .with_param("q", "${term}")
            .with_param("empty", "")
            .with_param("", "ignored");
        let request = materialize(&def, &runtime(&[("term", json!("rust lang"))]), &[]).unwrap();
        assert_eq!(request.url, "https://x/search?page=1&q=rust+lang&empty=");
    }

    #[test]
    fn test_default_headers_and_override() {
        let def = ChainRequest::new("a", Method::Post, "https://x/")
            .with_header("content-type", "text/plain")
            .with_header("X-Trace", "${trace}");
        let request = materialize(&def, &runtime(&[("trace", json!(7))]), &[]).unwrap();

        assert_eq!(request.header("Accept"), Some("application/json"));
        assert_eq!(request.header("Content-Type"), Some("text/plain"));
        assert_eq!(request.header("x-trace"), Some("7"));
        assert_eq!(request.headers.len(), 3);
    }

    #[test]
    fn test_graphql_envelope() {
        let def = ChainRequest::new("q", Method::Post, "https://x/graphql")
            .with_graphql("query($id: ID!) { user(id: $id) { name } }", r#"{"id": "${uid}"}"#);
        let request = materialize(&def, &runtime(&[("uid", json!("u1"))]), &[]).unwrap();

        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "query": "query($id: ID!) { user(id: $id) { name } }",
                "variables": {"id": "u1"}
            })
        );
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(
            request.header("Accept"),
            Some("application/graphql-response+json, application/json")
        );
    }

    #[test]
    fn test_graphql_invalid_variables_omitted() {
        let def = ChainRequest::new("q", Method::Post, "https://x/graphql")
            .with_graphql("{ me { id } }", "{not json");
        let request = materialize(&def, &RuntimeVariables::new(), &[]).unwrap();

        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"query": "{ me { id } }"}));
    }

    #[test]
    fn test_parse_graphql_variables() {
        assert_eq!(parse_graphql_variables("").unwrap(), None);
        assert_eq!(parse_graphql_variables(r#"{"a":1}"#).unwrap(), Some(json!({"a": 1})));
        let err = parse_graphql_variables("{").unwrap_err();
        assert_eq!(err.kind.code(), "GRAPHQL_ERROR");
    }

    #[test]
    fn test_basic_auth() {
        let def = ChainRequest::new("a", Method::Get, "https://x/").with_auth(Auth::Basic {
            username: "${user}".to_string(),
            password: "secret".to_string(),
        });
        let request = materialize(&def, &runtime(&[("user", json!("admin"))]), &[]).unwrap();
        assert_eq!(request.header("Authorization"), Some("Basic YWRtaW46c2VjcmV0"));
    }

    #[test]
    fn test_bearer_auth_overrides_explicit_header() {
        let def = ChainRequest::new("a", Method::Get, "https://x/")
            .with_header("Authorization", "old")
            .with_auth(Auth::Bearer {
                token: "${token}".to_string(),
            });
        let request = materialize(&def, &runtime(&[("token", json!("abc"))]), &[]).unwrap();
        assert_eq!(request.header("authorization"), Some("Bearer abc"));
    }

    #[test]
    fn test_api_key_in_header_and_query() {
        let header = ChainRequest::new("a", Method::Get, "https://x/").with_auth(Auth::ApiKey {
            key: "X-Api-Key".to_string(),
            value: "k1".to_string(),
            add_to: ApiKeyLocation::Header,
        });
        let request = materialize(&header, &RuntimeVariables::new(), &[]).unwrap();
        assert_eq!(request.header("X-Api-Key"), Some("k1"));

        let query = ChainRequest::new("a", Method::Get, "https://x/items").with_auth(Auth::ApiKey {
            key: "api_key".to_string(),
            value: "k1".to_string(),
            add_to: ApiKeyLocation::Query,
        });
        let request = materialize(&query, &RuntimeVariables::new(), &[]).unwrap();
        assert_eq!(request.url, "https://x/items?api_key=k1");
    }

    #[test]
    fn test_empty_bearer_token_adds_nothing() {
        let def = ChainRequest::new("a", Method::Get, "https://x/").with_auth(Auth::Bearer {
            token: String::new(),
        });
        let request = materialize(&def, &RuntimeVariables::new(), &[]).unwrap();
        assert_eq!(request.header("Authorization"), None);
    }

    #[test]
    fn test_repository_variable_in_url() {
        let repo = vec![DataVariable::fixed("host", DataKind::Text, "api.test")];
        let def = ChainRequest::new("a", Method::Get, "https://${host}/v1");
        let request = materialize(&def, &RuntimeVariables::new(), &repo).unwrap();
        assert_eq!(request.url, "https://api.test/v1");
    }

    #[test]
    fn test_invalid_url() {
        let def = ChainRequest::new("a", Method::Get, "${base}/users");
        let err = materialize(&def, &RuntimeVariables::new(), &[]).unwrap_err();
        assert_eq!(err.kind.code(), "URL_ERROR");
    }

    #[test]
    fn test_relative_url_with_base() {
        let base = Url::parse("http://localhost:8080/api/").unwrap();
        let def = ChainRequest::new("a", Method::Get, "users/${id}");
        let vars = runtime(&[("id", json!(5))]);
        let request = Materializer::new(&vars, &[])
            .with_base_url(Some(&base))
            .materialize(&def)
            .unwrap();
        assert_eq!(request.url, "http://localhost:8080/api/users/5");
    }
}
