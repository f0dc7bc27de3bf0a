use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别
/// 默认级别: info
///
/// 示例:
/// - RUST_LOG=debug chainpost run chain.json
/// - RUST_LOG=chainpost::chain=trace chainpost run chain.json
pub fn init_logger() {
    init_logger_with("info");
}

/// 使用指定的默认级别初始化日志（RUST_LOG 仍然优先）
pub fn init_logger_with(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .try_init();

    tracing::debug!(default_level, "Logger initialized");
}
