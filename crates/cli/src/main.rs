use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use declutter_core::{CleanConfig, ContentSource, Operation, OperationReport, OutputConfig, Pipeline, PipelineConfig, Session};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod echo;
mod menu;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Clean HTML files, strip or separate their tables, and save their main content
#[derive(Parser, Debug)]
#[command(name = "declutter")]
#[command(author = "Declutter Contributors")]
#[command(version)]
#[command(about = "Clean HTML files and separate their tables", long_about = None)]
struct Args {
    /// Local HTML file (prompted for when omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Run an operation without the menu (0 clean, 1 remove tables, 2 separate tables, 3 save content)
    #[arg(short, long = "select", value_name = "N")]
    select: Vec<Operation>,

    /// Directory for output files (default: next to the input)
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Extract content from the cleaned page instead of the original
    #[arg(long)]
    from_cleaned: bool,

    /// Keep images when cleaning
    #[arg(long)]
    keep_images: bool,

    /// Keep span elements when cleaning
    #[arg(long)]
    keep_spans: bool,

    /// Keep lang attributes when cleaning
    #[arg(long)]
    keep_lang: bool,

    /// Do not wrap paragraphs that held images
    #[arg(long)]
    no_wrap_images: bool,

    /// Keep empty elements and empty tables
    #[arg(long)]
    keep_empty: bool,

    /// Treat missing tables or content as a failure
    #[arg(long)]
    strict: bool,

    /// Print a JSON report for every operation on stdout
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut clean = CleanConfig::builder();
        if self.keep_images {
            clean = clean.keep_tag("img");
        }
        if self.keep_spans {
            clean = clean.keep_wrapper("span");
        }
        if self.keep_lang {
            clean = clean.keep_attribute("lang");
        }
        if self.no_wrap_images {
            clean = clean.wrap_image_paragraphs(false);
        }
        if self.keep_empty {
            clean = clean.remove_empty(false).remove_empty_tables(false);
        }

        PipelineConfig {
            clean: clean.build(),
            output: OutputConfig { out_dir: self.out_dir.clone() },
            content_source: if self.from_cleaned { ContentSource::Cleaned } else { ContentSource::Raw },
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "declutter=debug,declutter_core=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

fn progress_message(op: Operation) -> &'static str {
    match op {
        Operation::Clean => "Cleaning HTML content...",
        Operation::RemoveTables => "Removing tables...",
        Operation::SeparateTables => "Separating and removing tables...",
        Operation::SaveContent => "Saving content...",
    }
}

/// Runs one operation on a fresh session and prints its outcome.
fn run_operation(pipeline: &Pipeline, path: &Path, op: Operation, args: &Args) -> anyhow::Result<OperationReport> {
    let session = Session::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let report = pipeline
        .run(&session, op)
        .with_context(|| format!("{} failed", op.label()))?;

    echo::print_report(&report);
    if args.json {
        println!("{}", serde_json::to_string(&report).context("Failed to serialize report")?);
    }

    if args.strict {
        return report.into_strict().with_context(|| format!("{} produced nothing", op.label()));
    }
    Ok(report)
}

fn run_selected(pipeline: &Pipeline, path: &Path, args: &Args) -> anyhow::Result<()> {
    let total = args.select.len();
    let started = Instant::now();
    let mut timings: Vec<(String, Duration)> = Vec::with_capacity(total);
    let mut failed = 0;

    for (index, op) in args.select.iter().copied().enumerate() {
        if args.verbose {
            echo::print_step(index + 1, total, progress_message(op));
        }

        let op_started = Instant::now();
        if let Err(e) = run_operation(pipeline, path, op, args) {
            echo::print_error(&format!("{:#}", e));
            failed += 1;
        }
        timings.push((op.to_string(), op_started.elapsed()));
    }

    if args.verbose {
        eprintln!();
        echo::print_timing_summary(started.elapsed(), &timings);
    }

    if failed > 0 {
        anyhow::bail!("{} of {} operations failed", failed, total);
    }
    Ok(())
}

fn run_interactive<R: BufRead, W: Write>(
    pipeline: &Pipeline, path: &Path, args: &Args, input: &mut R, output: &mut W,
) -> anyhow::Result<()> {
    menu::run_loop(input, output, |op| {
        echo::print_info(progress_message(op));
        let started = Instant::now();
        match run_operation(pipeline, path, op, args) {
            Ok(_) if args.verbose => echo::print_timing(&op.to_string(), started.elapsed()),
            Ok(_) => {}
            Err(e) => echo::print_error(&format!("{:#}", e)),
        }
    })
    .context("Failed to read menu input")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "declutter", &mut io::stdout());
        return Ok(());
    }

    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let (path, session) = match &args.input {
        Some(path) => {
            let session = Session::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            (path.clone(), session)
        }
        None => loop {
            let Some(path) = menu::prompt_path(&mut input, &mut output).context("Failed to read the file path")?
            else {
                return Ok(());
            };
            match Session::open(&path) {
                Ok(session) => break (path, session),
                Err(e) => echo::print_error(&format!("Failed to open {}: {}", path.display(), e)),
            }
        },
    };
    if args.verbose {
        eprintln!(
            "  {} {} ({})",
            "Source:".dimmed(),
            path.display().bright_white(),
            echo::format_size(session.raw_html().len())
        );
        eprintln!();
    }

    let pipeline = Pipeline::with_readability(args.pipeline_config());

    if args.select.is_empty() {
        run_interactive(&pipeline, &path, &args, &mut input, &mut output)
    } else {
        run_selected(&pipeline, &path, &args)
    }
}
