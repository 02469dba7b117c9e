//! cogtrace-insights - cognitive pattern report for one session log

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::CommonArgs;
use cogtrace_core::format::{format_percent, format_rate, title_case};
use cogtrace_core::SessionReport;

#[derive(Parser)]
#[command(name = "cogtrace-insights")]
#[command(about = "Report cognitive patterns, learning moments and hypothesis testing")]
#[command(version)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let session = cli::analyze(&args.common)?;
    tracing::info!(log = %args.common.log.display(), "Rendering insights report");

    if !cli::print_json(&session.report, args.common.format)? {
        print_report(&session.report);
    }
    Ok(())
}

fn print_report(report: &SessionReport) {
    println!("\n=== COGNITIVE PATTERN ANALYSIS ===\n");

    println!("## Cognitive Pattern Frequency");
    if report.patterns.categories.is_empty() {
        println!("\n  (no cognitive patterns matched)");
    }
    for category in &report.patterns.categories {
        println!(
            "\n{}: {} instances",
            title_case(&category.name),
            category.count
        );
        if !category.examples.is_empty() {
            println!("  Examples:");
            for example in &category.examples {
                println!("    - \"{}\"", example);
            }
        }
    }

    let learning = &report.learning;
    println!("\n## Learning Moments Identified: {}", learning.count);
    for moment in &learning.moments {
        println!("  - \"{}\"", moment);
    }

    let hypotheses = &report.hypotheses;
    println!("\n## Hypothesis Testing");
    println!("  Hypotheses formed: {}", hypotheses.formed);
    println!("  Actually tested: {}", hypotheses.tested);
    println!("  Test rate: {}", format_rate(hypotheses.completion_rate));
    println!(
        "  Result observed: {}",
        format_rate(hypotheses.resolution_rate)
    );
    if hypotheses.superseded > 0 {
        println!("  Replaced before testing: {}", hypotheses.superseded);
    }

    println!("\n## Cognitive Style Summary");
    if report.patterns.total_matches > 0 {
        println!("\nPattern Distribution:");
        for category in &report.patterns.categories {
            println!(
                "  {}: {}",
                title_case(&category.name),
                format_percent(category.share)
            );
        }
    }
    if learning.count > 0 {
        println!(
            "\nLearning Velocity: {} insights discovered",
            report.insights.learning_velocity
        );
    }
    println!(
        "\nExperimental Tendency: {} exploration instances",
        report.insights.experimental_tendency
    );
}
