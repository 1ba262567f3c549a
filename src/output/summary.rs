//! Console summary of a report.

use crate::aggregator::{LineProfile, Report};
use crate::utils::config::ticks_to_ms;
use colored::*;

/// Render the slowest lines and functions as text tables
pub fn render_summary(report: &Report, max_lines: usize) -> String {
    let mut out = String::new();

    out.push_str("\n⏱  ");
    out.push_str(&"Profile Summary".bold().to_string());
    out.push_str("\n---------------------------------------------------\n");
    out.push_str(&format!(
        "Trace duration:     {:.3} ms\n",
        ticks_to_ms(report.total_duration)
    ));
    out.push_str(&format!(
        "Stopwatch duration: {:.3} ms\n",
        ticks_to_ms(report.stopwatch_duration)
    ));
    out.push_str(&format!("Events:             {}\n", report.events.len()));
    out.push_str("---------------------------------------------------\n");

    out.push_str(&render_table(
        "Top lines by duration",
        &report.lines.duration,
        max_lines,
    ));
    out.push_str(&render_table(
        "Top lines by self duration",
        &report.lines.self_duration,
        max_lines,
    ));
    out.push_str(&render_table(
        "Top functions by duration",
        &report.functions.duration,
        max_lines,
    ));

    out
}

fn render_table(title: &str, profiles: &[LineProfile], max_lines: usize) -> String {
    let mut out = format!("\n{}\n", title.bold());
    out.push_str(&format!(
        "  {:>7} {:>12} {:>12} {:>8}  {}\n",
        "%", "Duration", "Self", "Hits", "Location"
    ));

    for profile in profiles.iter().take(max_lines) {
        let percent = format!("{:>6.2}%", profile.percent);
        let percent = if profile.percent >= 50.0 {
            percent.red().to_string()
        } else if profile.percent >= 10.0 {
            percent.yellow().to_string()
        } else {
            percent
        };

        out.push_str(&format!(
            "  {} {:>10.3}ms {:>10.3}ms {:>8}  {}:{} {}\n",
            percent,
            profile.duration_ms(),
            profile.self_duration_ms(),
            profile.hit_count,
            profile.name,
            profile.line,
            truncate(&profile.text, 40).dimmed()
        ));
    }

    if profiles.len() > max_lines {
        out.push_str(&format!(
            "  (Showing top {} of {})\n",
            max_lines,
            profiles.len()
        ));
    }

    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
