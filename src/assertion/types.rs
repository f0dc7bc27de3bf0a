use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 一个步骤上声明的断言
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseAssertions {
    /// 期望的状态码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// 响应时间上限（秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,

    /// 期望的 header 值（名称大小写不敏感）
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<BodyAssertion>,
}

impl ResponseAssertions {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.response_time.is_none()
            && self.headers.is_empty()
            && self.body.is_empty()
    }
}

/// 针对响应体路径的断言
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyAssertion {
    pub path: String,
    pub operator: AssertionOperator,
    #[serde(default)]
    pub value: Value,
}

impl BodyAssertion {
    pub fn new(path: impl Into<String>, operator: AssertionOperator, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            operator,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssertionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Exists,
    NotExists,
    GreaterThan,
    LessThan,
    Matches,
}

impl AssertionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::Exists => "exists",
            Self::NotExists => "notExists",
            Self::GreaterThan => "greaterThan",
            Self::LessThan => "lessThan",
            Self::Matches => "matches",
        }
    }
}

impl fmt::Display for AssertionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 断言结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResults {
    pub passed: bool,
    pub details: AssertionDetails,
    pub failure_messages: Vec<String>,
}

impl Default for AssertionResults {
    fn default() -> Self {
        Self {
            passed: true,
            details: AssertionDetails::default(),
            failure_messages: Vec::new(),
        }
    }
}

impl AssertionResults {
    pub(crate) fn fail(&mut self, message: String) {
        self.passed = false;
        self.failure_messages.push(message);
    }
}

/// 每一项检查的通过情况，未声明的检查为 `None` 或不出现
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<bool>,
    #[serde(default)]
    pub headers: IndexMap<String, bool>,
    #[serde(default)]
    pub body: IndexMap<String, bool>,
}

impl AssertionDetails {
    /// 已执行的检查数
    pub fn total(&self) -> usize {
        usize::from(self.status.is_some())
            + usize::from(self.response_time.is_some())
            + self.headers.len()
            + self.body.len()
    }

    /// 通过的检查数
    pub fn passed(&self) -> usize {
        usize::from(self.status == Some(true))
            + usize::from(self.response_time == Some(true))
            + self.headers.values().filter(|p| **p).count()
            + self.body.values().filter(|p| **p).count()
    }
}
