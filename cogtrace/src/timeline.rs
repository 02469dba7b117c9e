//! cogtrace-timeline - activity and intensity timelines for one session log

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::CommonArgs;
use cogtrace_core::format::{activity_bar, flow_arrow, format_ratio, intensity_bar};
use cogtrace_core::SessionReport;

#[derive(Parser)]
#[command(name = "cogtrace-timeline")]
#[command(about = "Visualize tool activity and cognitive intensity over time")]
#[command(version)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let session = cli::analyze(&args.common)?;
    tracing::info!(log = %args.common.log.display(), "Rendering timeline");

    if !cli::print_json(&session.report, args.common.format)? {
        print_report(&session.report);
    }
    Ok(())
}

fn print_report(report: &SessionReport) {
    let timeline = &report.timeline;

    println!("\n=== SESSION TIMELINE VISUALIZATION ===\n");
    println!("Time (min) | Activity");
    println!("{}", "-".repeat(50));
    for row in &timeline.activity {
        if row.total == 0 {
            println!("{:>10} | ", row.start_minutes);
            continue;
        }
        let summary = row
            .tools
            .iter()
            .map(|t| format!("{}({})", t.name, t.count))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:>10} | {} {}",
            row.start_minutes,
            activity_bar(row.total),
            summary
        );
    }

    println!("\n=== TOOL FLOW PATTERN ===\n");
    println!("(Most common sequences)");
    for flow in &timeline.flows {
        println!(
            "{:>15} {} {} ({}x)",
            flow.from,
            flow_arrow(flow.count),
            flow.to,
            flow.count
        );
    }

    println!("\n=== COGNITIVE INTENSITY MAP ===\n");
    println!("(Questions and exclamations over time)");
    println!("Time | Cognitive Intensity");
    println!("{}", "-".repeat(50));
    let peak = timeline.summary.peak_intensity;
    for bucket in timeline.intensity.iter().filter(|b| b.score > 0) {
        println!(
            "{:>4} | {} ({})",
            bucket.start_minutes,
            intensity_bar(bucket.score, peak),
            bucket.score
        );
    }

    let summary = &timeline.summary;
    println!("\n=== SESSION SUMMARY ===");
    println!("Active span: {} minutes", summary.active_span_minutes);
    println!("Total tool uses: {}", summary.total_tool_uses);
    println!(
        "Tools per minute: {}",
        format_ratio(summary.tools_per_minute)
    );
    println!("Unique tool sequences: {}", summary.unique_transitions);
    println!("Peak cognitive intensity: {}", summary.peak_intensity);
}
