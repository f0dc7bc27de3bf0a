use serde_json::Value;

use crate::jsonpath::types::{JsonPath, PathSegment, parse_index};

/// 按路径取原始值，任何一步缺失都返回 `None`
pub fn get_value<'a>(root: &'a Value, path: &JsonPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |current, segment| step(current, segment))
}

/// [`get_value`] 的字符串路径版本
pub fn get_raw<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    get_value(root, &JsonPath::parse(path))
}

/// 按路径取值并转为展示用字符串，缺失时为空字符串
pub fn get_display(root: &Value, path: &str) -> String {
    get_raw(root, path).map(display_value).unwrap_or_default()
}

fn step<'a>(current: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (current, segment) {
        (Value::Object(map), PathSegment::Field(key)) => map.get(key),
        (Value::Object(map), PathSegment::Index(index)) => map.get(&index.to_string()),
        (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
        (Value::Array(items), PathSegment::Field(key)) => {
            parse_index(key).and_then(|index| items.get(index))
        }
        _ => None,
    }
}

/// 展示用的有损字符串化
///
/// - 数组: `[v1, v2, ...]`
/// - 对象: `key: value, key: value`
/// - 标量原样，`null` 为空字符串
/// - 嵌套的数组/对象以紧凑 JSON 表示
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(display_nested).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, display_nested(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => display_scalar(other),
    }
}

fn display_nested(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        other => display_scalar(other),
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
