use serde_json::Value;

use crate::jsonpath::types::needs_brackets;

/// 列出 JSON 文档中所有可寻址的路径
///
/// 深度优先、父路径在子路径之前、对象按键的插入顺序。
/// 数组只展开第一个元素（`[0]`），用于预览结构而不是枚举所有元素。
/// 标量根节点没有路径。
pub fn list_paths(root: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    walk(root, "", &mut paths);
    paths
}

fn walk(value: &Value, path: &str, paths: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = join_key(path, key);
                paths.push(child_path.clone());
                walk(child, &child_path, paths);
            }
        }
        Value::Array(items) => {
            if let Some(first) = items.first() {
                let child_path = format!("{}[0]", path);
                paths.push(child_path.clone());
                walk(first, &child_path, paths);
            }
        }
        _ => {}
    }
}

fn join_key(parent: &str, key: &str) -> String {
    if needs_brackets(key) {
        format!("{}[\"{}\"]", parent, key)
    } else if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}
