//! docsplit CLI - split PDF bundles by document type

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docsplit::{
    JsonFormat, MatchKind, OutputFormat, SectionMatchType, SplitReport, Splitter, SplitterConfig,
};

#[derive(Parser)]
#[command(name = "docsplit")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Split PDF bundles into one file per document type", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output root directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify pages and write one file per section
    Split {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output root directory; sections go to <DIR>/<file stem>/
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "pdf")]
        format: Format,

        #[command(flatten)]
        settings: Settings,

        /// Write the run report as JSON
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Classify pages without writing any section files
    Classify {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        settings: Settings,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate and print the effective catalog
    Catalog {
        /// Configuration file (JSON)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args, Default)]
struct Settings {
    /// Configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum confidence for exact matches (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    min_confidence: Option<u8>,

    /// Minimum similarity for fuzzy matches (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    fuzzy_threshold: Option<u8>,

    /// Attach pages without a heading to the preceding section
    #[arg(long)]
    attach_continuations: bool,

    /// Match pages on a single thread
    #[arg(long)]
    sequential: bool,
}

impl Settings {
    /// Configuration file values with command line flags on top.
    fn splitter(&self) -> Result<Splitter, Box<dyn std::error::Error>> {
        let config = match &self.config {
            Some(path) => SplitterConfig::load(path)?,
            None => SplitterConfig::default(),
        };

        let mut splitter = Splitter::from_config(&config)?;
        if let Some(value) = self.min_confidence {
            splitter = splitter.with_min_confidence(value);
        }
        if let Some(value) = self.fuzzy_threshold {
            splitter = splitter.with_fuzzy_threshold(value);
        }
        if self.attach_continuations {
            splitter = splitter.attach_continuations();
        }
        if self.sequential {
            splitter = splitter.sequential();
        }
        Ok(splitter)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Pages copied from the source PDF
    Pdf,
    /// Word document
    Docx,
    /// Plain text
    Txt,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Pdf => OutputFormat::Pdf,
            Format::Docx => OutputFormat::Docx,
            Format::Txt => OutputFormat::Txt,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Split {
            input,
            output,
            format,
            settings,
            report,
        }) => cmd_split(
            &input,
            output.as_deref(),
            format,
            &settings,
            report.as_deref(),
        ),
        Some(Commands::Classify {
            input,
            settings,
            json,
        }) => cmd_classify(&input, &settings, json),
        Some(Commands::Catalog { config }) => cmd_catalog(config.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: split if input is provided
            if let Some(input) = cli.input {
                cmd_split(
                    &input,
                    cli.output.as_deref(),
                    Format::Pdf,
                    &Settings::default(),
                    None,
                )
            } else {
                println!("{}", "Usage: docsplit <FILE> [OUTPUT]".yellow());
                println!("       docsplit --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn cmd_split(
    input: &Path,
    output: Option<&Path>,
    format: Format,
    settings: &Settings,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let splitter = settings.splitter()?.with_format(format.into());
    let output_root = output.unwrap_or_else(|| Path::new("."));
    log::debug!("Effective options: {:?}", splitter.options());

    let pb = spinner("Splitting PDF...");
    let report = match splitter.split_file(input, output_root) {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    pb.finish_and_clear();

    print_report(&report);

    if let Some(path) = report_path {
        fs::write(path, report.to_json(JsonFormat::Pretty)?)?;
        println!("{} {}", "Report saved to".green(), path.display());
    }

    Ok(())
}

fn match_label(match_type: SectionMatchType) -> colored::ColoredString {
    match match_type {
        SectionMatchType::Exact => "exact".green(),
        SectionMatchType::Fuzzy => "fuzzy".yellow(),
        SectionMatchType::Mixed => "mixed".yellow(),
        SectionMatchType::None => "unmatched".dimmed(),
    }
}

fn print_report(report: &SplitReport) {
    println!("{}", "Sections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let last = report.sections.len().saturating_sub(1);
    for (i, section) in report.sections.iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        let pages: Vec<String> = section.pages.iter().map(|p| (p + 1).to_string()).collect();
        let target = match &section.output {
            Some(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            None => "not written".red().to_string(),
        };
        println!(
            "  {} {} [{}] pages {} ({}) -> {}",
            branch.dimmed(),
            section.heading.bold(),
            match_label(section.match_type),
            pages.join(","),
            section.confidence,
            target
        );
    }

    println!();
    println!("{}: {}", "Output".bold(), report.output_dir.display());
    println!("{}: {}", "Pages".bold(), report.page_count);
    println!("{}: {}", "Pages in Others".bold(), report.others_pages.len());

    for failure in &report.page_failures {
        println!(
            "{} page {}: {}",
            "Warning".yellow().bold(),
            failure.page + 1,
            failure.reason
        );
    }
    for failure in &report.render_failures {
        println!(
            "{} '{}': {}",
            "Failed".red().bold(),
            failure.heading,
            failure.reason
        );
    }

    if report.is_clean() {
        println!("\n{}", "Done!".green().bold());
    } else {
        println!("\n{}", "Done with errors".yellow().bold());
    }
}

fn cmd_classify(
    input: &Path,
    settings: &Settings,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let splitter = settings.splitter()?;
    let outcome = splitter.classify_file(input)?;

    if json {
        let sections: Vec<_> = outcome
            .sections
            .iter()
            .map(|s| {
                serde_json::json!({
                    "heading": s.heading,
                    "pages": s.pages,
                    "confidence": s.confidence,
                    "match_type": s.match_type,
                })
            })
            .collect();
        let value = serde_json::json!({
            "matches": outcome.matches,
            "sections": sections,
            "page_failures": outcome.page_failures,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for m in &outcome.matches {
        let kind = match m.kind {
            MatchKind::Exact => "exact".green(),
            MatchKind::Fuzzy => "fuzzy".yellow(),
            MatchKind::None => "none".dimmed(),
        };
        println!(
            "  {:>4}  {:<6} {:>3}  {}",
            m.page_index + 1,
            kind,
            m.confidence,
            m.document_type.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!("{}", "Sections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for section in &outcome.sections {
        let pages: Vec<String> = section.pages.iter().map(|p| (p + 1).to_string()).collect();
        println!(
            "  {} [{}] pages {}",
            section.heading.bold(),
            match_label(section.match_type),
            pages.join(",")
        );
    }

    for failure in &outcome.page_failures {
        println!(
            "{} page {}: {}",
            "Warning".yellow().bold(),
            failure.page + 1,
            failure.reason
        );
    }

    Ok(())
}

fn cmd_catalog(config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => SplitterConfig::load(path)?,
        None => SplitterConfig::default(),
    };
    let catalog = config.catalog()?;

    println!("{}", "Document Types".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for document_type in catalog.types() {
        let marker = if document_type.is_exact_only() {
            " (exact only)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("{}{}", document_type.name().bold(), marker);
        for variant in document_type.variants().iter().skip(1) {
            println!("  {} {}", "├─".dimmed(), variant);
        }
    }
    println!("\n{} {} types", "Valid:".green().bold(), catalog.len());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docsplit".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF bundle splitter");
    println!();
    println!("License: MIT");
}
