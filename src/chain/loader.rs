use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::chain::types::ChainRequest;
use crate::{ChainpostError, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum ChainFile {
    List(Vec<ChainRequest>),
    Document { requests: Vec<ChainRequest> },
}

impl From<ChainFile> for Vec<ChainRequest> {
    fn from(file: ChainFile) -> Self {
        match file {
            ChainFile::List(requests) | ChainFile::Document { requests } => requests,
        }
    }
}

/// 请求链文件加载器
///
/// JSON 文件可以是步骤数组，也可以是 `{"requests": [...]}`；
/// TOML 文件使用 `[[requests]]` 表数组。
pub struct ChainLoader;

impl ChainLoader {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ChainRequest>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::parse_toml(&content),
            Some("json") | None => Self::parse_json(&content),
            Some(other) => Err(ChainpostError::ParseError(format!(
                "不支持的请求链文件类型: .{}",
                other
            ))),
        }
    }

    pub fn parse_json(content: &str) -> Result<Vec<ChainRequest>> {
        let file: ChainFile = serde_json::from_str(content)?;
        Ok(file.into())
    }

    pub fn parse_toml(content: &str) -> Result<Vec<ChainRequest>> {
        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            requests: Vec<ChainRequest>,
        }

        let document: Document = toml::from_str(content)?;
        Ok(document.requests)
    }
}
