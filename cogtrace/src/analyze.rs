//! cogtrace-analyze - tool usage and behaviour report for one session log
//!
//! Prints tool statistics, common tool sequences, file operations, coarse
//! thinking patterns, session flow and behavioural insights.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::CommonArgs;
use cogtrace_core::format::{format_duration_ms, title_case};
use cogtrace_core::SessionReport;

#[derive(Parser)]
#[command(name = "cogtrace-analyze")]
#[command(about = "Summarize tool usage and behaviour in a session log")]
#[command(version)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let session = cli::analyze(&args.common)?;
    tracing::info!(log = %args.common.log.display(), "Rendering analysis report");

    if !cli::print_json(&session.report, args.common.format)? {
        print_report(&session.report);
    }
    Ok(())
}

fn print_report(report: &SessionReport) {
    println!("Loaded {} events from session", report.event_count);
    println!("\n=== SESSION ANALYSIS REPORT ===\n");

    println!("## Tool Usage Statistics");
    if report.tools.top_tools.is_empty() {
        println!("  (no tool invocations)");
    }
    for tool in &report.tools.top_tools {
        println!("  {}: {} times", tool.name, tool.count);
    }

    println!("\n## Common Tool Sequences");
    for t in &report.tools.top_transitions {
        println!("  {} → {}: {} times", t.from, t.to, t.count);
    }

    println!("\n## File Operations");
    for resource in &report.tools.file_operations {
        println!("\n  {}:", resource.tool);
        for file in &resource.files {
            println!("    {}: {} times", file.name, file.count);
        }
    }

    println!("\n## Thinking Patterns");
    for category in &report.coarse.categories {
        println!(
            "  {}: {} occurrences",
            title_case(&category.name),
            category.count
        );
    }

    if let Some(flow) = &report.flow {
        println!("\n## Session Flow");
        println!("  Started: {}", flow.start.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("  Duration: {}", format_duration_ms(flow.duration_ms));
        println!("  Messages: {}", flow.message_count);
        println!(
            "  Avg time between messages: {}",
            format_duration_ms(flow.avg_gap_ms)
        );
    }

    let insights = &report.insights;
    println!("\n## Behavioral Insights");
    println!(
        "\n  Documentation files created: {}",
        insights.documentation_files.len()
    );
    for doc in &insights.documentation_files {
        println!("    - {}", doc);
    }
    println!(
        "  Read-before-modify pattern: {} times",
        insights.read_before_modify
    );
    println!("  Questions asked: {}", insights.questions);
    println!("  Excitement expressions: {}", insights.excitement);
    println!(
        "  Tool calls with stated reasoning: {}/{}",
        report.decisions.with_reasoning, report.decisions.total
    );
}
