use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

use crate::chain::types::{ChainRequest, ChainResponse, ChainSummary};

pub struct ChainReporter {
    verbose: bool,
}

impl ChainReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// 打印执行开始
    pub fn print_header(&self, source: &str, total: usize) {
        println!("\nRunning chain of {} requests from {}...\n", total, source.bold());
    }

    /// 打印单个步骤的结果
    pub fn print_result(&self, index: usize, def: &ChainRequest, result: &ChainResponse) {
        if result.is_skipped() {
            println!(
                " {} [{}] {} {} {} {}",
                "⊘".dimmed(),
                index + 1,
                def.display_name(),
                def.method.to_string().cyan(),
                def.url,
                "(skipped: dependencies failed)".dimmed()
            );
            return;
        }

        let ok = !result.is_failure();
        let symbol = if ok { "✓".green() } else { "✗".red() };
        let time = result
            .response_time
            .map(|t| format!("{}ms", (t * 1000.0).round() as u64))
            .unwrap_or_default();

        println!(
            " {} [{}] {} {} {} {} ({})",
            symbol,
            index + 1,
            def.display_name(),
            def.method.to_string().cyan(),
            def.url,
            status_label(result),
            time
        );

        if let Some(error) = &result.error {
            println!("   {}: {}", "Error".red().bold(), error);
        }

        if let Some(assertions) = &result.assertions {
            if assertions.passed {
                println!("   {} assertions passed", "✓".green());
            } else {
                for message in &assertions.failure_messages {
                    println!("   {} {}", "✗".red(), message.red());
                }
            }
        }

        if self.verbose && !result.data.is_null() {
            let body = serde_json::to_string_pretty(&result.data)
                .unwrap_or_else(|_| result.data.to_string());
            for line in body.lines() {
                println!("   {}", line.dimmed());
            }
        }
    }

    /// 打印所有步骤的汇总表格
    pub fn print_table(&self, definitions: &[ChainRequest], results: &[ChainResponse]) {
        println!("{}", results_table(definitions, results));
    }

    /// 打印统计摘要
    pub fn print_summary(&self, summary: &ChainSummary) {
        println!("\n{}", "━".repeat(50));
        println!("{}", "Summary".bold());
        println!("{}", "━".repeat(50));

        println!(
            "  {}: {} passed, {} failed, {} skipped, {} total",
            "Steps".bold(),
            summary.passed.to_string().green(),
            summary.failed.to_string().red(),
            summary.skipped.to_string().dimmed(),
            summary.total
        );

        if summary.total_assertions > 0 {
            println!(
                "  {}: {} passed, {} failed, {} total",
                "Assertions".bold(),
                summary.passed_assertions.to_string().green(),
                summary.failed_assertions.to_string().red(),
                summary.total_assertions
            );
        }

        println!("  {}: {:.3}s", "Duration".bold(), summary.total_time);
        println!();
    }
}

impl Default for ChainReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

fn status_label(result: &ChainResponse) -> String {
    if result.status == 0 {
        result.status_text.clone()
    } else {
        format!("{} {}", result.status, result.status_text)
    }
}

/// 结果表格：一行一个步骤
pub fn results_table(definitions: &[ChainRequest], results: &[ChainResponse]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Step", "Method", "URL", "Status", "Time", "Assertions"]);

    for (index, (def, result)) in definitions.iter().zip(results).enumerate() {
        let status_color = if result.is_skipped() {
            Color::DarkGrey
        } else if result.is_failure() {
            Color::Red
        } else {
            Color::Green
        };

        let assertions = match &result.assertions {
            Some(a) if a.passed => "pass".to_string(),
            Some(a) => format!("{} failed", a.failure_messages.len()),
            None => "-".to_string(),
        };

        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(def.display_name()),
            Cell::new(def.method),
            Cell::new(&def.url).add_attribute(Attribute::Dim),
            Cell::new(status_label(result)).fg(status_color),
            Cell::new(
                result
                    .response_time
                    .map(|t| format!("{:.0}ms", t * 1000.0))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(assertions),
        ]);
    }

    table
}
