use std::fmt;

/// 路径中的一步访问
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// 属性访问: `.name` 或 `["name"]`
    Field(String),
    /// 下标访问: `[0]`
    Index(usize),
}

/// 解析后的点号/方括号路径，例如 `data.items[0].id`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// 解析路径表达式，永不失败
    ///
    /// 规则：
    /// - `.` 和 `[` `]` 分隔各段，空段被丢弃，属性名中的空白原样保留
    /// - 方括号内的纯数字为下标，其余（可带引号）为属性名
    /// - 方括号内的 `.` 不作为分隔符
    pub fn parse(path: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut in_bracket = false;

        for ch in path.chars() {
            match ch {
                '.' if !in_bracket => push_field(&mut segments, &mut current),
                '[' if !in_bracket => {
                    push_field(&mut segments, &mut current);
                    in_bracket = true;
                }
                ']' if in_bracket => {
                    push_bracket(&mut segments, &mut current);
                    in_bracket = false;
                }
                _ => current.push(ch),
            }
        }

        if in_bracket {
            push_bracket(&mut segments, &mut current);
        } else {
            push_field(&mut segments, &mut current);
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn push_field(segments: &mut Vec<PathSegment>, current: &mut String) {
    if !current.is_empty() {
        segments.push(PathSegment::Field(std::mem::take(current)));
    }
}

fn push_bracket(segments: &mut Vec<PathSegment>, current: &mut String) {
    let token = std::mem::take(current);
    let token = token.trim();
    if token.is_empty() {
        return;
    }

    if let Some(index) = parse_index(token) {
        segments.push(PathSegment::Index(index));
        return;
    }

    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| {
            token
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(token);
    segments.push(PathSegment::Field(unquoted.to_string()));
}

/// 仅接受规范的非负整数（不允许前导 0）
pub(crate) fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

/// 属性名是否需要用 `["..."]` 形式书写
pub(crate) fn needs_brackets(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']'])
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
                PathSegment::Field(key) if needs_brackets(key) => write!(f, "[\"{}\"]", key)?,
                PathSegment::Field(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Field(key) => write!(f, ".{}", key)?,
            }
        }
        Ok(())
    }
}

impl From<&str> for JsonPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(s: &str) -> PathSegment {
        PathSegment::Field(s.to_string())
    }

    #[test]
    fn test_parse_dotted() {
        let path = JsonPath::parse("auth.token");
        assert_eq!(path.segments(), &[field("auth"), field("token")]);
    }

    #[test]
    fn test_parse_brackets() {
        let path = JsonPath::parse("data.items[0].id");
        assert_eq!(
            path.segments(),
            &[field("data"), field("items"), PathSegment::Index(0), field("id")]
        );
    }

    #[test]
    fn test_parse_discards_empty_tokens() {
        let path = JsonPath::parse(".a..b[]");
        assert_eq!(path.segments(), &[field("a"), field("b")]);
        assert!(JsonPath::parse("").is_empty());
        assert!(JsonPath::parse("  ").is_empty());
    }

    #[test]
    fn test_parse_quoted_key_with_dot() {
        let path = JsonPath::parse(r#"headers["x.request.id"]"#);
        assert_eq!(path.segments(), &[field("headers"), field("x.request.id")]);
    }

    #[test]
    fn test_parse_dotted_number_is_field() {
        let path = JsonPath::parse("items.0.id");
        assert_eq!(path.segments(), &[field("items"), field("0"), field("id")]);
    }

    #[test]
    fn test_parse_leading_index() {
        let path = JsonPath::parse("[1].name");
        assert_eq!(path.segments(), &[PathSegment::Index(1), field("name")]);
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("01"), None);
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("a"), None);
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["a.b[0].c", "[0].id", r#"meta["a.b"].c"#] {
            assert_eq!(JsonPath::parse(text).to_string(), text);
        }
    }
}
