use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::Result;
use crate::http::RetryPolicy;
use crate::variable::{DataVariable, InMemoryRepository};

/// 执行引擎配置（`[engine]`）
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// 单次请求超时（毫秒）
    pub timeout_ms: u64,
    /// 失败后的最大重试次数，4xx 不重试
    pub max_retries: u32,
    /// 指数退避基数（毫秒）
    pub backoff_base_ms: u64,
    /// 步骤之间的等待时间（毫秒）
    pub step_delay_ms: u64,
    /// 相对 URL 的基础地址
    pub base_url: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 2,
            backoff_base_ms: 1_000,
            step_delay_ms: 0,
            base_url: None,
        }
    }
}

impl EngineConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_millis(self.timeout_ms),
            max_retries: self.max_retries,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
        }
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

/// 完整的配置文件
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ChainpostConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    /// 数据仓库变量
    #[serde(default)]
    pub variables: Vec<DataVariable>,
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "chainpost.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ChainpostConfig> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<ChainpostConfig> {
        Ok(toml::from_str(content)?)
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及父目录
    /// 2. 用户配置目录 ~/.config/chainpost/
    pub fn find_and_load() -> Option<ChainpostConfig> {
        Self::try_load_from_current_dir().or_else(Self::try_load_from_user_dir)
    }

    fn try_load_from_current_dir() -> Option<ChainpostConfig> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Self::load_logged(&config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    fn try_load_from_user_dir() -> Option<ChainpostConfig> {
        let home = dirs::home_dir()?;
        let config_path = home
            .join(".config")
            .join("chainpost")
            .join(Self::CONFIG_FILE);

        if config_path.exists() {
            Self::load_logged(&config_path)
        } else {
            None
        }
    }

    fn load_logged(path: &Path) -> Option<ChainpostConfig> {
        match Self::load_from_path(path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "Loaded config file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                None
            }
        }
    }

    /// 构建数据仓库
    /// cli_vars: CLI 传入的变量覆盖（--var key=value），作为静态字符串变量，优先级最高
    pub fn build_repository(
        config: &ChainpostConfig,
        cli_vars: &[(String, String)],
    ) -> InMemoryRepository {
        let mut repository = InMemoryRepository::from_variables(config.variables.clone());

        for (key, value) in cli_vars {
            repository.set(key.clone(), value.clone());
        }

        repository
    }

    /// 解析 CLI 变量参数 "key=value"
    pub fn parse_cli_var(s: &str) -> Option<(String, String)> {
        s.split_once('=')
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
    }
}
