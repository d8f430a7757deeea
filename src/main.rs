use std::io::IsTerminal;
use std::io::Read;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};

use verdict_core::{OutputFormat, Severity, VerdictConfig, VerdictError};
use verdict_report::report::Analyzer;

#[derive(Parser)]
#[command(
    name = "verdict",
    version,
    about = "Heuristic pull-request quality scoring",
    long_about = "Verdict parses a unified diff, runs a set of heuristic quality rules over\n\
                   every changed file, and aggregates the findings into per-file and overall\n\
                   scores. Fully deterministic and offline; the changed code is never executed.\n\n\
                   Examples:\n  \
                     git diff | verdict analyze          Analyze staged changes\n  \
                     verdict analyze --file pr.patch     Analyze a local patch file\n  \
                     verdict analyze --fail-on warning   Non-zero exit for CI gates\n  \
                     verdict init                        Write a default .verdict.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .verdict.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a unified diff and score it
    #[command(long_about = "Analyze a unified diff and score it.\n\n\
        Parses the diff, runs the heuristic rule set over every changed file,\n\
        and prints findings with per-file and overall scores. Reads from stdin\n\
        or a file.\n\n\
        Examples:\n  git diff | verdict analyze\n  verdict analyze --file changes.patch --format json")]
    Analyze {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,

        /// Additional glob patterns to skip (e.g. "*.test.ts")
        #[arg(long)]
        skip_pattern: Vec<String>,

        /// Exit with non-zero code if findings meet severity threshold
        #[arg(
            long,
            long_help = "Exit with non-zero code if findings of this severity or higher are found.\n\nSeverity ranking: error > warning > info.\nUseful in CI pipelines to fail builds on serious issues."
        )]
        fail_on: Option<Severity>,

        /// Exit with non-zero code if the overall score is below this value
        #[arg(long)]
        fail_under: Option<f64>,
    },
    /// Write a default .verdict.toml to the current directory
    Init,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# Verdict Configuration
# See: https://github.com/verdict-dev/verdict

[rules]
# line_length_threshold = 120
# large_file_line_threshold = 400
# deletion_heavy_ratio = 3.0
# secret_keywords = ["PRIVATE_KEY", "API_KEY", "SECRET", "TOKEN"]

[score.severity_penalties]
# info = 1
# warning = 5
# error = 15

[filter]
# skip_patterns = ["*.min.js", "vendor/**"]
# skip_extensions = ["snap", "lock"]
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => VerdictConfig::from_file(path)?,
        None => {
            let default_path = std::path::Path::new(".verdict.toml");
            if default_path.exists() {
                VerdictConfig::from_file(default_path)?
            } else {
                VerdictConfig::default()
            }
        }
    };

    if cli.verbose {
        eprintln!("format: {}", cli.format);
    }

    match cli.command {
        None => {
            print_welcome();
        }
        Some(Command::Analyze {
            ref file,
            ref skip_pattern,
            fail_on,
            fail_under,
        }) => {
            let mut config = config;
            config
                .filter
                .skip_patterns
                .extend(skip_pattern.iter().cloned());

            let analyzer = Analyzer::new(&config)?;
            let input = read_diff_input(file.as_deref())?;
            let report = analyzer.analyze(&input)?;

            if cli.verbose {
                eprintln!(
                    "analyzed {} files, {} skipped",
                    report.summary.total_files, report.summary.skipped_files,
                );
            }

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&report).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    print!("{}", report.to_markdown());
                }
                OutputFormat::Text => {
                    print!("{report}");
                }
            }

            if let Some(threshold) = fail_on {
                let has_findings = report
                    .findings
                    .iter()
                    .any(|f| f.severity.meets_threshold(threshold));
                if has_findings {
                    std::process::exit(1);
                }
            }

            if let Some(threshold) = fail_under {
                if report.score.overall < threshold {
                    std::process::exit(1);
                }
            }
        }
        Some(Command::Init) => {
            let path = std::path::Path::new(".verdict.toml");
            if path.exists() {
                miette::bail!(".verdict.toml already exists, refusing to overwrite");
            }
            std::fs::write(path, DEFAULT_CONFIG)
                .into_diagnostic()
                .wrap_err("writing .verdict.toml")?;
            println!("Wrote .verdict.toml");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "verdict", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn read_diff_input(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) => {
            if !path.exists() {
                return Err(VerdictError::FileNotFound(path.to_path_buf()).into());
            }
            std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading {}", path.display()))
        }
        None => {
            if std::io::stdin().is_terminal() {
                miette::bail!(miette::miette!(
                    help = "pipe a diff (git diff | verdict analyze) or pass --file",
                    "no diff input provided"
                ));
            }
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .into_diagnostic()
                .wrap_err("reading diff from stdin")?;
            Ok(input)
        }
    }
}

fn print_welcome() {
    println!("verdict — heuristic pull-request quality scoring\n");
    println!("Usage:");
    println!("  git diff | verdict analyze         Analyze a diff from stdin");
    println!("  verdict analyze --file pr.patch    Analyze a local patch file");
    println!("  verdict analyze --format json      Machine-readable report");
    println!("  verdict init                       Write a default .verdict.toml");
    println!();
    println!("Run 'verdict --help' for all options.");
}
