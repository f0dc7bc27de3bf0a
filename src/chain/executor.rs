use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use url::Url;

use crate::assertion;
use crate::chain::materializer::Materializer;
use crate::chain::types::{ChainRequest, ChainResponse};
use crate::config::ChainpostConfig;
use crate::http::{Client, Transport};
use crate::jsonpath::get_raw;
use crate::variable::{DataRepository, DataVariable, InMemoryRepository, RuntimeVariables};
use crate::{ChainpostError, Result};

/// 请求链执行器
///
/// 按顺序执行步骤：依赖判断 → 展开请求 → 发送 → 断言 → 提取变量。
/// 单个步骤的失败只体现在结果里，只有定义本身不合法时才返回错误。
pub struct ChainExecutor<T: Transport = Client> {
    transport: T,
    repository: Arc<dyn DataRepository>,
    step_delay: Duration,
    base_url: Option<Url>,
}

impl ChainExecutor<Client> {
    pub fn new() -> Result<Self> {
        Ok(Self::with_transport(Client::new()?))
    }

    /// 按配置文件构建：重试策略、步骤间隔、基础 URL
    pub fn from_config(
        config: &ChainpostConfig,
        repository: Arc<dyn DataRepository>,
    ) -> Result<Self> {
        let client = Client::with_policy(config.engine.retry_policy())?;
        let base_url = config
            .engine
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()?;

        Ok(Self::with_transport(client)
            .with_repository(repository)
            .with_step_delay(config.engine.step_delay())
            .with_base_url(base_url))
    }
}

impl<T: Transport> ChainExecutor<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            repository: Arc::new(InMemoryRepository::new()),
            step_delay: Duration::ZERO,
            base_url: None,
        }
    }

    pub fn with_repository(mut self, repository: Arc<dyn DataRepository>) -> Self {
        self.repository = repository;
        self
    }

    /// 步骤之间的等待时间，第一个步骤前不等待
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn with_base_url(mut self, base_url: Option<Url>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 执行整条请求链，返回每个步骤的结果
    pub async fn execute(&self, definitions: &[ChainRequest]) -> Result<Vec<ChainResponse>> {
        self.execute_with(definitions, |_| {}).await
    }

    /// 执行请求链，每完成一个步骤就以当前全部结果回调一次
    pub async fn execute_with<F>(
        &self,
        definitions: &[ChainRequest],
        mut on_progress: F,
    ) -> Result<Vec<ChainResponse>>
    where
        F: FnMut(&[ChainResponse]) + Send,
    {
        validate_definitions(definitions)?;

        // 数据仓库在一次执行中只读
        let repository = self.repository.variables();
        let mut runtime = RuntimeVariables::new();
        let mut results: Vec<ChainResponse> = Vec::with_capacity(definitions.len());

        info!(steps = definitions.len(), "Starting chain");
        let started = Instant::now();

        for (index, def) in definitions.iter().enumerate() {
            if index > 0 && !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }

            if !dependencies_met(def, &results) {
                warn!(request = %def.id, depends_on = ?def.depends_on, "Skipping step, dependencies failed");
                results.push(ChainResponse::skipped(&def.id));
                on_progress(&results);
                continue;
            }

            let response = self.run_step(def, &runtime, &repository).await;
            extract_variables(def, &response, &mut runtime);

            results.push(response);
            on_progress(&results);
        }

        info!(
            steps = results.len(),
            failed = results.iter().filter(|r| r.is_failure()).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chain completed"
        );

        Ok(results)
    }

    async fn run_step(
        &self,
        def: &ChainRequest,
        runtime: &RuntimeVariables,
        repository: &[DataVariable],
    ) -> ChainResponse {
        let started = Instant::now();

        let sent = match Materializer::new(runtime, repository)
            .with_base_url(self.base_url.as_ref())
            .materialize(def)
        {
            Ok(request) => {
                debug!(request = %def.id, method = %request.method, url = %request.url, "Sending step");
                self.transport.send(&request).await
            }
            Err(err) => Err(err),
        };
        let elapsed = started.elapsed().as_secs_f64();

        let mut response = match sent {
            Ok(raw) => {
                info!(request = %def.id, status = raw.status, elapsed_ms = (elapsed * 1000.0) as u64, "Step completed");
                ChainResponse {
                    request_id: def.id.clone(),
                    status: raw.status,
                    data: raw.data(),
                    status_text: raw.status_text,
                    headers: raw.headers,
                    error: None,
                    error_details: None,
                    response_time: Some(elapsed),
                    assertions: None,
                }
            }
            Err(err) => {
                warn!(request = %def.id, error = %err, "Step failed");
                ChainResponse::from_error(&def.id, &err, elapsed)
            }
        };

        if let Some(assertions) = def.assertions.as_ref().filter(|a| !a.is_empty()) {
            let results = assertion::validate(&response, assertions);
            if !results.passed {
                debug!(request = %def.id, failures = ?results.failure_messages, "Assertions failed");
            }
            response.assertions = Some(results);
        }

        response
    }
}

/// 所有依赖都已有结果且没有失败
fn dependencies_met(def: &ChainRequest, results: &[ChainResponse]) -> bool {
    def.depends_on.iter().all(|id| {
        results
            .iter()
            .find(|r| &r.request_id == id)
            .is_some_and(|r| !r.is_failure())
    })
}

/// 按提取规则更新运行时变量：取到值则覆盖，取不到则清除
fn extract_variables(def: &ChainRequest, response: &ChainResponse, runtime: &mut RuntimeVariables) {
    for (name, path) in &def.variables {
        match get_raw(&response.data, path) {
            Some(value) => {
                debug!(request = %def.id, variable = %name, path = %path, "Extracted variable");
                runtime.insert(name.clone(), value.clone());
            }
            None => {
                debug!(request = %def.id, variable = %name, path = %path, "Extraction path not found");
                runtime.remove(name);
            }
        }
    }
}

/// 检查定义列表本身是否合法
pub fn validate_definitions(definitions: &[ChainRequest]) -> Result<()> {
    let mut seen = HashSet::new();

    for (index, def) in definitions.iter().enumerate() {
        if def.id.trim().is_empty() {
            return Err(ChainpostError::InvalidDefinition(format!(
                "第 {} 个步骤缺少 id",
                index + 1
            )));
        }
        if !seen.insert(def.id.as_str()) {
            return Err(ChainpostError::InvalidDefinition(format!(
                "重复的步骤 id: {}",
                def.id
            )));
        }
        if def.url.trim().is_empty() {
            return Err(ChainpostError::InvalidDefinition(format!(
                "步骤 {} 缺少 url",
                def.id
            )));
        }
        if def.depends_on.iter().any(|dep| dep == &def.id) {
            return Err(ChainpostError::InvalidDefinition(format!(
                "步骤 {} 依赖自身",
                def.id
            )));
        }
    }

    Ok(())
}
