/// JSON 路径模块 - 按点号/方括号路径取值，以及列出文档中的所有路径
mod extractor;
mod paths;
mod types;

pub use extractor::{display_value, get_display, get_raw, get_value};
pub use paths::list_paths;
pub use types::{JsonPath, PathSegment};
