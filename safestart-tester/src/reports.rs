use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use safestart_core::ScoreResult;

use crate::runner::ScenarioResult;

fn generated_at() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn success_rate(results: &[ScenarioResult]) -> f64 {
    let total = u32::try_from(results.len()).unwrap_or(u32::MAX);
    if total == 0 {
        return 0.0;
    }
    let passed = u32::try_from(results.iter().filter(|r| r.passed).count()).unwrap_or(u32::MAX);
    f64::from(passed) / f64::from(total) * 100.0
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Logic Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total scenarios: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, result.scenario_name.bold())?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# SafeStart Logic Test Results\n")?;
    writeln!(out, "_Generated {}_\n", generated_at())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {} {}\n", status, result.scenario_name)?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_console_score(out: &mut dyn Write, store: &str, score: &ScoreResult) -> Result<()> {
    writeln!(out, "{}", "🏅 Stored Progress".bright_cyan().bold())?;
    writeln!(out, "{}", "==================".cyan())?;
    writeln!(out, "Store: {store}")?;
    for section in score.sections.iter() {
        writeln!(
            out,
            "  {:18} {:>4} / {:<4}",
            section.label, section.earned, section.max
        )?;
    }
    writeln!(
        out,
        "Total: {} / {} ({}%)",
        score.earned_points, score.max_points, score.percent
    )?;
    writeln!(out, "Rank: {}", score.rank_title.bold())?;
    Ok(())
}

pub fn generate_markdown_score(out: &mut dyn Write, store: &str, score: &ScoreResult) -> Result<()> {
    writeln!(out, "# SafeStart Stored Progress\n")?;
    writeln!(out, "_Generated {}_\n", generated_at())?;
    writeln!(out, "Store: `{store}`\n")?;
    writeln!(out, "| Section | Earned | Max |")?;
    writeln!(out, "|---|---:|---:|")?;
    for section in score.sections.iter() {
        writeln!(out, "| {} | {} | {} |", section.label, section.earned, section.max)?;
    }
    writeln!(
        out,
        "\n**Total**: {} / {} ({}%), rank **{}**",
        score.earned_points, score.max_points, score.percent, score.rank_title
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: name.to_string(),
            passed,
            iterations_run: 2,
            successful_iterations: if passed { 2 } else { 1 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["iteration 1: boom".to_string()]
            },
            average_duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn markdown_lists_failures() {
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &[result("smoke", true), result("reset", false)])
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("- **Success rate**: 50.0%"));
        assert!(text.contains("### ❌ reset"));
        assert!(text.contains("  - iteration 1: boom"));
    }

    #[test]
    fn empty_results_have_zero_rate() {
        assert!(success_rate(&[]).abs() < f64::EPSILON);
    }
}
