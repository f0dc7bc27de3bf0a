mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志系统，--verbose 时默认输出 debug
    if cli.verbose() {
        chainpost::logger::init_logger_with("debug");
    } else {
        chainpost::logger::init_logger();
    }

    if !cli::run(cli).await? {
        std::process::exit(1);
    }
    Ok(())
}
