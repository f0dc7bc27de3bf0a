use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::Result;
use crate::http::error::TransportError;
use crate::http::request::Request;
use crate::http::response::{RawResponse, reason_phrase};

/// 发送请求的传输层，执行器只依赖这个 trait
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request) -> std::result::Result<RawResponse, TransportError>;
}

/// 超时与重试策略
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 单次请求超时
    pub timeout: Duration,
    /// 首次请求失败后的最大重试次数
    pub max_retries: u32,
    /// 第 n 次重试前等待 `backoff_base * 2^n`
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 2,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
    policy: RetryPolicy,
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::with_policy(RetryPolicy::default())
    }

    pub fn with_policy(policy: RetryPolicy) -> Result<Self> {
        let inner = reqwest::Client::builder().build()?;
        Ok(Self { inner, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn send_once(&self, request: &Request) -> std::result::Result<RawResponse, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| TransportError::url(format!("Invalid URL: {} ({})", request.url, e)))?;

        let mut req = self
            .inner
            .request(request.method.into(), url)
            .timeout(self.policy.timeout);

        req = req.headers(header_map(&request.headers)?);

        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        let response = req.send().await?;

        let status = response.status();
        let status_text = reason_phrase(status.as_u16()).to_string();
        let headers: IndexMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::http(
                status.as_u16(),
                status_text,
                headers,
                &body,
            ));
        }

        Ok(RawResponse {
            status: status.as_u16(),
            status_text,
            headers,
            body,
        })
    }
}

/// 校验并转换请求头，非法的名称或值在发送前就报错
fn header_map(
    headers: &IndexMap<String, String>,
) -> std::result::Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| TransportError::request(format!("Invalid header name {:?}: {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::request(format!("Invalid value for header {:?}: {}", key, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl Transport for Client {
    async fn send(&self, request: &Request) -> std::result::Result<RawResponse, TransportError> {
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = self.policy.delay_for(attempt);
                debug!(attempt, ?delay, "Waiting before retry");
                tokio::time::sleep(delay).await;
            }

            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(err) if !err.is_retryable() || attempt >= self.policy.max_retries => {
                    return Err(err);
                }
                Err(err) => {
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        error = %err,
                        attempt = attempt + 1,
                        "Request failed, retrying"
                    );
                }
            }

            attempt += 1;
        }
    }
}
