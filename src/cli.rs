use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};

use chainpost::chain::{ChainExecutor, ChainLoader, ChainReporter, ChainSummary};
use chainpost::config::{ChainpostConfig, ConfigLoader};
use chainpost::jsonpath::list_paths;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 执行请求链文件（.json 或 .toml）
    Run {
        path: PathBuf,

        /// 配置文件路径，默认向上查找 chainpost.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 覆盖数据仓库变量（key=value，可重复）
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// 显示响应体
        #[arg(short, long)]
        verbose: bool,

        /// 以 JSON 输出全部结果
        #[arg(long)]
        json: bool,
    },

    /// 列出 JSON 文件中所有可寻址的路径
    Paths { path: PathBuf },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        matches!(self.command, Commands::Run { verbose: true, .. })
    }
}

fn parse_var(s: &str) -> std::result::Result<(String, String), String> {
    ConfigLoader::parse_cli_var(s).ok_or_else(|| format!("expected KEY=VALUE, got `{}`", s))
}

/// 执行命令，返回是否全部成功
pub async fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Run {
            path,
            config,
            vars,
            verbose,
            json,
        } => run_chain(path, config, vars, verbose, json).await,
        Commands::Paths { path } => {
            for line in json_paths(&path)? {
                println!("{}", line);
            }
            Ok(true)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ChainpostConfig> {
    match path {
        Some(path) => ConfigLoader::load_from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ConfigLoader::find_and_load().unwrap_or_default()),
    }
}

async fn run_chain(
    path: PathBuf,
    config: Option<PathBuf>,
    vars: Vec<(String, String)>,
    verbose: bool,
    json: bool,
) -> Result<bool> {
    let config = load_config(config.as_deref())?;
    let repository = ConfigLoader::build_repository(&config, &vars);

    let definitions = ChainLoader::load_from_path(&path)
        .with_context(|| format!("Failed to load chain {}", path.display()))?;

    let executor = ChainExecutor::from_config(&config, Arc::new(repository))?;
    let reporter = ChainReporter::new(verbose);

    if !json {
        reporter.print_header(&path.display().to_string(), definitions.len());
    }

    let results = executor
        .execute_with(&definitions, |partial| {
            if json {
                return;
            }
            if let Some(latest) = partial.last() {
                let index = partial.len() - 1;
                reporter.print_result(index, &definitions[index], latest);
            }
        })
        .await?;

    let summary = ChainSummary::from_results(&results);

    if json {
        let output = json!({ "results": results, "summary": summary });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!();
        reporter.print_table(&definitions, &results);
        reporter.print_summary(&summary);
    }

    Ok(summary.all_passed())
}

fn json_paths(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let root: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(list_paths(&root))
}
