mod assets;
mod reports;
mod runner;
mod scenarios;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use assets::TesterAssets;
use runner::{LogicTester, ScenarioResult};
use safestart_core::{FileStore, Microsite};
use scenarios::{expand_scenarios, get_scenario, list_scenarios};

#[derive(Debug, Parser)]
#[command(name = "safestart-tester", version = "0.1.0")]
#[command(about = "Automated QA testing for the SafeStart progress and scoring logic")]
struct Args {
    /// Content document to test against (defaults to the bundled one)
    #[arg(long)]
    content: Option<PathBuf>,

    /// Rank table JSON overriding the stock titles
    #[arg(long)]
    ranks: Option<PathBuf>,

    /// Store file (JSON string map) to inspect with --score-only
    #[arg(long)]
    store: Option<PathBuf>,

    /// Print the score of the store file and exit
    #[arg(long, requires = "store")]
    score_only: bool,

    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Number of iterations per scenario
    #[arg(long, default_value_t = 1)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    let assets = TesterAssets::new(args.content.clone(), args.ranks.clone());

    if args.score_only {
        return write_score(&args, &assets);
    }

    announce_banner(&assets);

    let start_time = Instant::now();
    let results = run_scenarios(&args, &assets);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner(assets: &TesterAssets) {
    println!("{}", "🦺 SafeStart Automated Tester".bright_cyan().bold());
    println!("{}", "=============================".cyan());
    println!("Content: {}", assets.content_label());
}

fn run_scenarios(args: &Args, assets: &TesterAssets) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(assets, args.verbose);
    let mut results = Vec::new();
    for name in expand_scenarios(&args.scenarios) {
        let Some(scenario) = get_scenario(&name) else {
            eprintln!("⚠️  Unknown scenario: {}", name.yellow());
            continue;
        };
        let result = tester.run_scenario(scenario, args.iterations);
        if result.passed {
            println!("✅ {} - {:?}", name.green(), result.average_duration);
        } else {
            eprintln!("❌ {} - {} failure(s)", name.red(), result.failures.len());
        }
        results.push(result);
    }
    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => reports::generate_json_report(output_target.writer(), results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    output_target.writer(),
                    "# SafeStart Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                reports::generate_markdown_report(output_target.writer(), results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(output_target.writer(), "No logic scenarios executed.")?;
            } else {
                reports::generate_console_report(
                    output_target.writer(),
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(
                output_target.writer(),
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

fn write_score(args: &Args, assets: &TesterAssets) -> Result<()> {
    let Some(path) = args.store.as_ref() else {
        bail!("--score-only needs --store <file>");
    };
    if !path.exists() {
        bail!("store file {} does not exist", path.display());
    }
    let site = Microsite::from_loader(assets, FileStore::new(path))
        .with_context(|| format!("failed to open store {}", path.display()))?;
    let score = site.calculate_score();
    log::info!(
        "{} scored {}/{}",
        path.display(),
        score.earned_points,
        score.max_points
    );

    let label = path.display().to_string();
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => reports::generate_json_report(output_target.writer(), &score)?,
        "markdown" => reports::generate_markdown_score(output_target.writer(), &label, &score)?,
        _ => reports::generate_console_score(output_target.writer(), &label, &score)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
