use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainpostError {
    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("无效的请求链定义: {0}")]
    InvalidDefinition(String),

    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP 客户端错误: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML 解析错误: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("URL 解析错误: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ChainpostError {
    fn from(err: anyhow::Error) -> Self {
        ChainpostError::Other(err.to_string())
    }
}

/// Result type for chainpost crate
pub type Result<T> = std::result::Result<T, ChainpostError>;
