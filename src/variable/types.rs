use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::variable::generator;

/// 单次请求链执行期间累积的运行时变量
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeVariables {
    variables: HashMap<String, Value>,
}

impl RuntimeVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入变量，覆盖同名旧值
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// 获取可用于替换的字符串值，`null` 视为未设置
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.variables.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value_to_string(value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.variables.remove(key)
    }

    pub fn clear(&mut self) {
        self.variables.clear();
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.variables.iter()
    }
}

/// 运行时变量值转为替换文本：字符串原样，容器为紧凑 JSON
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 数据仓库变量的类型，以及各类型专属的生成配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DataKind {
    #[serde(rename = "string")]
    Text,
    Number,
    SingleDigit,
    Boolean,
    Object,
    FirstName,
    LastName,
    FullName,
    Email,
    EmailWithDomain {
        #[serde(default)]
        email_domain: Option<String>,
    },
    StaticPassword {
        #[serde(default)]
        static_value: Option<String>,
    },
    DynamicPassword {
        #[serde(default)]
        password_length: Option<usize>,
        #[serde(default)]
        special_chars: Option<String>,
    },
    PhoneNumber,
    Date,
    PastDate,
    FutureDate,
    City,
    State,
    Country,
    CountryCode,
    ZipCode,
    Uuid,
    Color,
    Url,
    Ipv4,
    Ipv6,
    Alphanumeric,
}

impl DataKind {
    pub fn name(&self) -> &'static str {
        match self {
            DataKind::Text => "string",
            DataKind::Number => "number",
            DataKind::SingleDigit => "singleDigit",
            DataKind::Boolean => "boolean",
            DataKind::Object => "object",
            DataKind::FirstName => "firstName",
            DataKind::LastName => "lastName",
            DataKind::FullName => "fullName",
            DataKind::Email => "email",
            DataKind::EmailWithDomain { .. } => "emailWithDomain",
            DataKind::StaticPassword { .. } => "staticPassword",
            DataKind::DynamicPassword { .. } => "dynamicPassword",
            DataKind::PhoneNumber => "phoneNumber",
            DataKind::Date => "date",
            DataKind::PastDate => "pastDate",
            DataKind::FutureDate => "futureDate",
            DataKind::City => "city",
            DataKind::State => "state",
            DataKind::Country => "country",
            DataKind::CountryCode => "countryCode",
            DataKind::ZipCode => "zipCode",
            DataKind::Uuid => "uuid",
            DataKind::Color => "color",
            DataKind::Url => "url",
            DataKind::Ipv4 => "ipv4",
            DataKind::Ipv6 => "ipv6",
            DataKind::Alphanumeric => "alphanumeric",
        }
    }

    /// 按类型规范化文本值
    ///
    /// - number: 规范化数字文本，无法解析时保留原文
    /// - boolean: `true` / `false`
    /// - object: 重新序列化为紧凑 JSON，无法解析时保留原文
    pub fn normalize(&self, raw: &str) -> String {
        match self {
            DataKind::Number | DataKind::SingleDigit => match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => format_number(n),
                _ => raw.to_string(),
            },
            DataKind::Boolean => {
                if raw.trim().eq_ignore_ascii_case("true") {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            DataKind::Object => serde_json::from_str::<Value>(raw)
                .map(|v| v.to_string())
                .unwrap_or_else(|_| raw.to_string()),
            _ => raw.to_string(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// 数据仓库变量：静态值或每次解析时重新生成的动态值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataVariable {
    pub name: String,
    #[serde(flatten)]
    pub kind: DataKind,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub is_dynamic: bool,
}

impl DataVariable {
    pub fn fixed(name: impl Into<String>, kind: DataKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
            is_dynamic: false,
        }
    }

    pub fn dynamic(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            kind,
            value: String::new(),
            is_dynamic: true,
        }
    }

    /// 解析当前值，动态变量每次调用都会重新生成
    pub fn resolve_value(&self) -> String {
        if self.is_dynamic {
            let generated = generator::generate(&self.kind);
            self.kind.normalize(&generated)
        } else {
            self.kind.normalize(&self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_runtime_variables_basic() {
        let mut vars = RuntimeVariables::new();
        assert!(vars.is_empty());

        vars.insert("token", "abc");
        vars.insert("id", json!(42));
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get_string("token"), Some("abc".to_string()));
        assert_eq!(vars.get_string("id"), Some("42".to_string()));
        assert_eq!(vars.get_string("missing"), None);

        vars.insert("token", "def");
        assert_eq!(vars.get_string("token"), Some("def".to_string()));
    }

    #[test]
    fn test_runtime_null_is_unset() {
        let mut vars = RuntimeVariables::new();
        vars.insert("nothing", Value::Null);
        assert_eq!(vars.get("nothing"), Some(&Value::Null));
        assert_eq!(vars.get_string("nothing"), None);
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("x")), "x");
        assert_eq!(value_to_string(&json!(1.5)), "1.5");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!([1, 2])), "[1,2]");
        assert_eq!(value_to_string(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_normalize_number() {
        assert_eq!(DataKind::Number.normalize(" 042 "), "42");
        assert_eq!(DataKind::Number.normalize("3.50"), "3.5");
        assert_eq!(DataKind::Number.normalize("abc"), "abc");
    }

    #[test]
    fn test_normalize_boolean() {
        assert_eq!(DataKind::Boolean.normalize("TRUE"), "true");
        assert_eq!(DataKind::Boolean.normalize("yes"), "false");
    }

    #[test]
    fn test_normalize_object() {
        assert_eq!(
            DataKind::Object.normalize("{ \"b\": 1,  \"a\": [1, 2] }"),
            r#"{"b":1,"a":[1,2]}"#
        );
        assert_eq!(DataKind::Object.normalize("{broken"), "{broken");
    }

    #[test]
    fn test_static_variable_resolves_stored_value() {
        let var = DataVariable::fixed("age", DataKind::Number, "30.0");
        assert_eq!(var.resolve_value(), "30");
        assert_eq!(var.resolve_value(), var.resolve_value());
    }

    #[test]
    fn test_data_variable_deserialize_with_config() {
        let var: DataVariable = serde_json::from_value(json!({
            "name": "signupEmail",
            "type": "emailWithDomain",
            "emailDomain": "corp.test",
            "isDynamic": true
        }))
        .unwrap();

        assert_eq!(var.name, "signupEmail");
        assert!(var.is_dynamic);
        assert_eq!(
            var.kind,
            DataKind::EmailWithDomain {
                email_domain: Some("corp.test".to_string())
            }
        );
        assert_eq!(var.kind.name(), "emailWithDomain");
    }

    #[test]
    fn test_data_variable_deserialize_plain_kind() {
        let var: DataVariable = serde_json::from_value(json!({
            "name": "greeting",
            "type": "string",
            "value": "hello"
        }))
        .unwrap();

        assert_eq!(var.kind, DataKind::Text);
        assert!(!var.is_dynamic);
        assert_eq!(var.resolve_value(), "hello");
    }
}
