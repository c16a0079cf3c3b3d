use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;

use framecount::analyzer::{Analyzer, FileReport, Verdict};
use framecount::config::{Config, LoggerConfig};
use framecount::logging;
use framecount::report::{self, Summary};
use framecount::scanner::DEFAULT_CHUNK_SIZE;
use framecount::server::UploadServer;

/// MPEG-1 Layer III validator and frame counter
#[derive(Parser, Debug)]
#[command(name = "framecount", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count the frames of MP3 files
    Count {
        /// Files to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Bytes read per chunk
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Also write a report (.json or .csv)
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,

        /// Log scan details
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the HTTP upload service
    Serve {
        /// TOML config file
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print a shell completion script
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Count {
            files,
            chunk_size,
            json,
            report,
            verbose,
        } => count(&files, chunk_size, json, report, verbose),
        Command::Serve { config, port } => serve(config, port),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "framecount", &mut io::stdout());
            ExitCode::SUCCESS
        }
    }
}

fn count(
    files: &[PathBuf],
    chunk_size: usize,
    json: bool,
    report_path: Option<PathBuf>,
    verbose: bool,
) -> ExitCode {
    logging::init(&LoggerConfig {
        level: if verbose { "debug" } else { "warn" }.to_string(),
        pretty_print: false,
        enabled: true,
    });

    let analyzer = Analyzer::new().with_chunk_size(chunk_size);
    let results: Vec<FileReport> = files.iter().map(|f| analyzer.analyze(f)).collect();

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for r in &results {
            print_result(r);
        }
        if results.len() > 1 {
            print_summary(&Summary::from_results(&results));
        }
    }

    if let Some(path) = report_path {
        if let Err(e) = report::generate(&path, &results) {
            eprintln!(
                "{} failed to write report {}: {}",
                "error:".red().bold(),
                path.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    }

    if results.iter().all(|r| r.verdict == Verdict::Valid) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_result(r: &FileReport) {
    let verdict = match r.verdict {
        Verdict::Valid => r.verdict.to_string().green().bold(),
        Verdict::Invalid => r.verdict.to_string().yellow().bold(),
        Verdict::Error => r.verdict.to_string().red().bold(),
    };

    match (r.frame_count, &r.error) {
        (Some(frames), _) => {
            let mut extras = Vec::new();
            if let Some(marker) = r.vbr_marker {
                extras.push(format!("{} frame skipped", marker));
            }
            if r.trailing_bytes > 0 {
                extras.push(format!("{} trailing bytes", r.trailing_bytes));
            }
            let extras = if extras.is_empty() {
                String::new()
            } else {
                format!(" ({})", extras.join(", ")).dimmed().to_string()
            };
            println!("{:<8} {:>8} frames  {}{}", verdict, frames, r.file_path, extras);
        }
        (None, error) => {
            println!(
                "{:<8} {:>8}         {}  {}",
                verdict,
                "-",
                r.file_path,
                error.as_deref().unwrap_or_default().dimmed()
            );
        }
    }
}

fn print_summary(summary: &Summary) {
    println!(
        "\n{} files: {} valid, {} invalid, {} errors, {} frames total",
        summary.total,
        summary.valid.to_string().green(),
        summary.invalid.to_string().yellow(),
        summary.error.to_string().red(),
        summary.frames
    );
}

fn serve(config_path: Option<PathBuf>, port: Option<u16>) -> ExitCode {
    let mut config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(port) = port {
        config.port = port;
    }

    logging::init(&config.logger);

    let server = match UploadServer::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "failed to start the web server");
            eprintln!("{} {}", "error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    server.run();
    ExitCode::SUCCESS
}
