/// 请求链模块 - 步骤定义、请求展开、顺序执行与结果输出
pub mod executor;
pub mod loader;
pub mod materializer;
pub mod reorder;
pub mod reporter;
pub mod types;

pub use executor::{ChainExecutor, validate_definitions};
pub use loader::ChainLoader;
pub use materializer::{Materializer, materialize, parse_graphql_variables};
pub use reorder::{prune_dependencies, reorder};
pub use reporter::{ChainReporter, results_table};
pub use types::{
    ApiKeyLocation, Auth, ChainRequest, ChainResponse, ChainSummary, ErrorDetails,
    SKIPPED_ERROR, SKIPPED_STATUS_TEXT,
};
