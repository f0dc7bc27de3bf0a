use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::variable::types::{DataVariable, RuntimeVariables};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// 变量替换器
pub struct VariableResolver;

impl VariableResolver {
    /// 替换文本中的所有 `${name}` 占位符
    ///
    /// 每个占位符先查运行时变量，再查数据仓库变量；
    /// 两边都找不到时保留原样，不会报错。
    pub fn resolve(text: &str, runtime: &RuntimeVariables, repository: &[DataVariable]) -> String {
        if !text.contains("${") {
            return text.to_string();
        }

        PLACEHOLDER
            .replace_all(text, |caps: &Captures| {
                let name = &caps[1];

                if let Some(value) = runtime.get_string(name) {
                    return value;
                }

                match repository.iter().find(|v| v.name == name) {
                    Some(variable) => variable.resolve_value(),
                    None => {
                        tracing::debug!(variable = name, "Unresolved placeholder left as-is");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    /// 文本中引用的所有变量名，按出现顺序
    pub fn placeholders(text: &str) -> Vec<String> {
        PLACEHOLDER
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}
